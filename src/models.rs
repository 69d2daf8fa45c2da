use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub company: String,
    pub logo: String,
    #[serde(rename = "new")]
    pub is_new: bool,
    pub featured: bool,
    pub position: String,
    pub role: String,
    pub level: String,
    #[serde(rename = "postedAt")]
    pub posted_at: String,
    pub contract: String,
    pub location: String,
    pub languages: Vec<String>,
    pub tools: Vec<String>,
}

impl Job {
    /// Every clickable tag on the card: role, level, languages, then tools.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        [self.role.as_str(), self.level.as_str()]
            .into_iter()
            .chain(self.languages.iter().map(String::as_str))
            .chain(self.tools.iter().map(String::as_str))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }

    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = Vec::new();
        if self.is_new {
            badges.push("NEW!");
        }
        if self.featured {
            badges.push("FEATURED");
        }
        badges
    }
}

#[cfg(test)]
pub(crate) fn sample_job(id: i64, role: &str, level: &str, languages: &[&str], tools: &[&str]) -> Job {
    Job {
        id,
        company: format!("Company {}", id),
        logo: format!("./images/company-{}.svg", id),
        is_new: false,
        featured: false,
        position: format!("{} Developer", role),
        role: role.to_string(),
        level: level.to_string(),
        posted_at: "1d ago".to_string(),
        contract: "Full Time".to_string(),
        location: "Remote".to_string(),
        languages: languages.iter().map(|s| s.to_string()).collect(),
        tools: tools.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "id": 1,
            "company": "Photosnap",
            "logo": "./images/photosnap.svg",
            "new": true,
            "featured": true,
            "position": "Senior Frontend Developer",
            "role": "Frontend",
            "level": "Senior",
            "postedAt": "1d ago",
            "contract": "Full Time",
            "location": "USA Only",
            "languages": ["HTML", "CSS", "JavaScript"],
            "tools": []
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, 1);
        assert!(job.is_new);
        assert!(job.featured);
        assert_eq!(job.posted_at, "1d ago");
        assert_eq!(job.languages, vec!["HTML", "CSS", "JavaScript"]);
        assert!(job.tools.is_empty());
    }

    #[test]
    fn test_tags_order() {
        let job = sample_job(1, "Fullstack", "Midweight", &["Python"], &["React", "Django"]);
        let tags: Vec<&str> = job.tags().collect();
        assert_eq!(tags, vec!["Fullstack", "Midweight", "Python", "React", "Django"]);
    }

    #[test]
    fn test_has_tag_is_case_sensitive() {
        let job = sample_job(1, "Frontend", "Junior", &["HTML"], &[]);
        assert!(job.has_tag("Frontend"));
        assert!(job.has_tag("Junior"));
        assert!(!job.has_tag("frontend"));
        assert!(!job.has_tag("CSS"));
    }

    #[test]
    fn test_badges() {
        let mut job = sample_job(1, "Frontend", "Junior", &[], &[]);
        assert!(job.badges().is_empty());
        job.is_new = true;
        job.featured = true;
        assert_eq!(job.badges(), vec!["NEW!", "FEATURED"]);
    }
}
