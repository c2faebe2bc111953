//! The project registry.
//!
//! Every portfolio project is described by one [`ProjectRecord`]. The
//! registry is built once from configuration before any page is opened
//! and is never mutated afterwards.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate project id '{0}'")]
    DuplicateId(String),

    #[error("project id '{0}' is not URL-safe (use letters, digits, '-' and '_')")]
    InvalidId(String),
}

/// One portfolio project.
///
/// Presentation-only fields (`date`, `thumb`, `impact`) are optional and
/// consumers check them through the `Option`, never by probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Unique, URL-safe identifier used in `?id=` links
    pub id: String,
    pub title: String,
    /// One-line summary shown under the title
    pub short: String,
    /// Technologies, in display order
    #[serde(default)]
    pub tech: Vec<String>,
    /// Repository URL
    pub repo: String,
    /// Path of the markdown document, relative to the docs location
    #[serde(alias = "mdPath", alias = "mdpath")]
    pub md_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Preview image path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// The read-only list of projects, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<ProjectRecord>,
}

impl ProjectRegistry {
    /// Build the registry, rejecting duplicate or non-URL-safe ids.
    pub fn new(projects: Vec<ProjectRecord>) -> Result<Self, RegistryError> {
        let mut seen = std::collections::HashSet::new();
        for project in &projects {
            if !is_url_safe(&project.id) {
                return Err(RegistryError::InvalidId(project.id.clone()));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(RegistryError::DuplicateId(project.id.clone()));
            }
        }
        Ok(Self { projects })
    }

    /// Look up a project by id.
    pub fn find(&self, id: &str) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn is_url_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
pub(crate) fn sample_project(id: &str, md_path: &str) -> ProjectRecord {
    ProjectRecord {
        id: id.to_string(),
        title: format!("{id} title"),
        short: format!("{id} summary"),
        tech: vec!["Rust".to_string()],
        repo: format!("https://github.com/example/{id}"),
        md_path: md_path.to_string(),
        date: None,
        thumb: None,
        impact: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_project() {
        let registry = ProjectRegistry::new(vec![
            sample_project("mysh", "projects/mysh.md"),
            sample_project("go-redis", "projects/go-redis.md"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.find("go-redis").map(|p| p.md_path.as_str()),
            Some("projects/go-redis.md")
        );
        assert!(registry.find("xyz").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = ProjectRegistry::new(vec![
            sample_project("mysh", "a.md"),
            sample_project("mysh", "b.md"),
        ]);
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateId("mysh".into()));
    }

    #[test]
    fn test_unsafe_id_rejected() {
        let result = ProjectRegistry::new(vec![sample_project("web server", "a.md")]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::InvalidId("web server".into())
        );
        assert!(ProjectRegistry::new(vec![sample_project("", "a.md")]).is_err());
    }

    #[test]
    fn test_record_accepts_camel_case_path() {
        let yaml = r#"
id: web-server
title: Multithreaded Web Server
short: A multithreaded HTTP server in C.
tech: [C, Concurrency]
repo: https://github.com/example/web-server
mdPath: projects/web-server.md
thumb: assets/web-server.gif
"#;
        let record: ProjectRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.md_path, "projects/web-server.md");
        assert_eq!(record.thumb.as_deref(), Some("assets/web-server.gif"));
        assert_eq!(record.date, None);
    }
}
