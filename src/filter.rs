use std::fmt;

use crate::models::Job;

/// Dropdown sentinel meaning "no role filtering".
pub const ALL_ROLES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleFilter {
    #[default]
    All,
    Tag(String),
}

impl RoleFilter {
    /// Maps a dropdown value to a filter; the "all" sentinel is the only special value.
    pub fn from_option(value: &str) -> Self {
        if value == ALL_ROLES {
            RoleFilter::All
        } else {
            RoleFilter::Tag(value.to_string())
        }
    }

    pub fn as_option(&self) -> &str {
        match self {
            RoleFilter::All => ALL_ROLES,
            RoleFilter::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for RoleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_option())
    }
}

/// The user's current selection. Starts with no sticky filters and the role set to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    sticky: Vec<String>,
    role: RoleFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sticky(&self) -> &[String] {
        &self.sticky
    }

    pub fn role(&self) -> &RoleFilter {
        &self.role
    }

    /// Tag click on a card. Returns false when the tag was already active.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.sticky.iter().any(|t| t == tag) {
            return false;
        }
        self.sticky.push(tag.to_string());
        true
    }

    /// Remove control on an active chip. Returns false when the tag was not active.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.sticky.len();
        self.sticky.retain(|t| t != tag);
        self.sticky.len() != before
    }

    pub fn can_clear(&self) -> bool {
        !self.sticky.is_empty()
    }

    /// Clear control. Leaves the role selection untouched.
    pub fn clear(&mut self) {
        self.sticky.clear();
    }

    pub fn select_role(&mut self, role: RoleFilter) {
        self.role = role;
    }

    pub fn is_identity(&self) -> bool {
        self.sticky.is_empty() && self.role == RoleFilter::All
    }
}

/// Sticky stage: the job must carry every active tag (role, level, language or tool).
pub fn passes_sticky(job: &Job, sticky: &[String]) -> bool {
    sticky.iter().all(|tag| job.has_tag(tag))
}

/// Role stage: matches role, languages or tools. Level is not consulted here.
pub fn passes_role(job: &Job, role: &RoleFilter) -> bool {
    match role {
        RoleFilter::All => true,
        RoleFilter::Tag(tag) => {
            job.role == *tag || job.languages.contains(tag) || job.tools.contains(tag)
        }
    }
}

/// Visible jobs in catalog order. Pure in (catalog, state).
pub fn visible_jobs<'a>(jobs: &'a [Job], state: &FilterState) -> Vec<&'a Job> {
    jobs.iter()
        .filter(|job| passes_sticky(job, &state.sticky))
        .filter(|job| passes_role(job, &state.role))
        .collect()
}
