//! Roster file schema and loader
//!
//! Candidates and prizes come from one file, TOML or JSON by extension:
//!
//! ```toml
//! [[candidates]]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! department = "Engineering"
//!
//! [[prizes]]
//! name = "Grand Prize"
//! quantity = 1
//! ```
//!
//! Rows without a name are skipped. A roster must end up with at least one
//! candidate; an empty prize list is allowed (prizes can be added later).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Candidate, Prize};

/// Raw roster file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterFile {
    #[serde(default)]
    pub candidates: Vec<CandidateRow>,
    #[serde(default)]
    pub prizes: Vec<PrizeRow>,
}

/// Candidate row as written in the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Prize row as written in the file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrizeRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    /// Total stock, defaults to 1
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Validated roster ready for a session
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub candidates: Vec<Candidate>,
    pub prizes: Vec<Prize>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RosterFile {
    /// Turn rows into models, dropping nameless ones
    pub fn into_roster(self) -> Result<Roster> {
        let total_rows = self.candidates.len();
        let candidates: Vec<Candidate> = self
            .candidates
            .into_iter()
            .filter_map(|row| {
                let name = non_blank(row.name)?;
                Some(Candidate {
                    id: row.id.unwrap_or_else(Uuid::new_v4),
                    name,
                    email: non_blank(row.email).unwrap_or_default(),
                    department: non_blank(row.department),
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(Error::Roster(
                "No valid candidates found, every row needs a name".into(),
            ));
        }
        if candidates.len() < total_rows {
            debug!(
                skipped = total_rows - candidates.len(),
                "Skipped candidate rows without a name"
            );
        }

        let prizes = self
            .prizes
            .into_iter()
            .filter_map(|row| {
                let name = non_blank(row.name)?;
                let mut prize = Prize::new(name, row.quantity.unwrap_or(1));
                if let Some(id) = row.id {
                    prize.id = id;
                }
                Some(prize)
            })
            .collect();

        Ok(Roster { candidates, prizes })
    }
}

impl Roster {
    /// Load a roster file, picking the parser from the extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Roster(format!(
                "Roster file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let roster = match extension.as_deref() {
            Some("toml") => Self::from_toml(&content)?,
            Some("json") => Self::from_json(&content)?,
            other => {
                return Err(Error::Roster(format!(
                    "Unsupported roster format: {}",
                    other.unwrap_or("(none)")
                )))
            }
        };

        info!(
            path = %path.display(),
            candidates = roster.candidates.len(),
            prizes = roster.prizes.len(),
            "Roster file loaded"
        );
        Ok(roster)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: RosterFile = toml::from_str(content)?;
        file.into_roster()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: RosterFile = serde_json::from_str(content)?;
        file.into_roster()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_minimal_roster() {
        let toml = r#"
[[candidates]]
name = "Ada"
email = "ada@example.com"
"#;
        let roster = Roster::from_toml(toml).unwrap();
        assert_eq!(roster.candidates.len(), 1);
        assert_eq!(roster.candidates[0].name, "Ada");
        assert!(roster.candidates[0].department.is_none());
        assert!(roster.prizes.is_empty());
    }

    #[test]
    fn test_parse_full_roster() {
        let toml = r#"
[[candidates]]
id = "6f1c1f0e-3c1b-4a8e-9a55-0d5b7b3f8e21"
name = "Ada"
email = "ada@example.com"
department = "Engineering"

[[candidates]]
name = "  "
email = "ghost@example.com"

[[candidates]]
name = "Bo"

[[prizes]]
name = "Grand Prize"

[[prizes]]
name = "Mug"
quantity = 10

[[prizes]]
quantity = 4
"#;
        let roster = Roster::from_toml(toml).unwrap();
        assert_eq!(roster.candidates.len(), 2);
        assert_eq!(
            roster.candidates[0].id.to_string(),
            "6f1c1f0e-3c1b-4a8e-9a55-0d5b7b3f8e21"
        );
        assert_eq!(roster.candidates[0].department.as_deref(), Some("Engineering"));
        assert_eq!(roster.candidates[1].email, "");

        assert_eq!(roster.prizes.len(), 2);
        assert_eq!(roster.prizes[0].total, 1);
        assert_eq!(roster.prizes[1].remaining, 10);
        assert_eq!(roster.prizes[1].total, 10);
    }

    #[test]
    fn test_parse_json_roster() {
        let json = r#"{
            "candidates": [{"name": "Ada", "email": "ada@example.com"}],
            "prizes": [{"name": "Mug", "quantity": 2}]
        }"#;
        let roster = Roster::from_json(json).unwrap();
        assert_eq!(roster.candidates.len(), 1);
        assert_eq!(roster.prizes[0].total, 2);
    }

    #[test]
    fn test_roster_without_candidates() {
        let toml = r#"
[[prizes]]
name = "Mug"
"#;
        assert!(matches!(Roster::from_toml(toml), Err(Error::Roster(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[[candidates]]\nname = \"Ada\"\nemail = \"ada@example.com\"").unwrap();

        let roster = Roster::load(&path).unwrap();
        assert_eq!(roster.candidates[0].name, "Ada");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.xlsx");
        std::fs::write(&path, "binary").unwrap();
        assert!(matches!(Roster::load(&path), Err(Error::Roster(_))));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Roster::load(&missing), Err(Error::Roster(_))));
    }
}
