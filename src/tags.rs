use std::collections::HashSet;

use crate::filter::ALL_ROLES;
use crate::models::Job;

/// Distinct role, language and tool values across the catalog, in first-seen order.
/// Levels are left out: the dropdown cannot pick a level, only a card click can.
pub fn extract_tags(jobs: &[Job]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags = Vec::new();

    for job in jobs {
        let candidates = std::iter::once(job.role.as_str())
            .chain(job.languages.iter().map(String::as_str))
            .chain(job.tools.iter().map(String::as_str));
        for tag in candidates {
            if seen.insert(tag) {
                tags.push(tag.to_string());
            }
        }
    }

    tags
}

/// The role dropdown's option list: the "all" sentinel followed by the extracted tags.
pub fn dropdown_options(jobs: &[Job]) -> Vec<String> {
    let mut options = vec![ALL_ROLES.to_string()];
    options.extend(extract_tags(jobs));
    options
}
