//! Win record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Candidate, Prize};

/// A revealed win. Only the caption is ever filled in after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinRecord {
    pub id: Uuid,
    pub candidate: Candidate,
    /// Prize as it stood right after this win was counted
    pub prize: Prize,
    pub timestamp: DateTime<Utc>,
    pub caption: Option<String>,
    /// Whether this win took a unit of stock (false in demo mode)
    pub inventory_applied: bool,
}

impl WinRecord {
    pub fn new(candidate: Candidate, prize: Prize, inventory_applied: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            prize,
            timestamp: Utc::now(),
            caption: None,
            inventory_applied,
        }
    }
}
