//! Candidate model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person who can be drawn. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            department: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Secondary line shown under the name on a reel: department, else the
    /// local part of the email address
    pub fn subtitle(&self) -> &str {
        match self.department.as_deref() {
            Some(dept) if !dept.trim().is_empty() => dept,
            _ => self.email.split('@').next().unwrap_or(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_prefers_department() {
        let c = Candidate::new("Lan", "lan.t@example.com").with_department("Data Eng");
        assert_eq!(c.subtitle(), "Data Eng");
    }

    #[test]
    fn test_subtitle_falls_back_to_email() {
        let c = Candidate::new("Lan", "lan.t@example.com");
        assert_eq!(c.subtitle(), "lan.t");

        let blank = Candidate::new("Minh", "minh@example.com").with_department("  ");
        assert_eq!(blank.subtitle(), "minh");
    }
}
