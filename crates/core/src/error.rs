//! Error types for the draw core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No eligible candidates remain")]
    EmptyPool,

    #[error("No prize selected")]
    NoPrizeSelected,

    #[error("Prize exhausted: {0}")]
    PrizeExhausted(String),

    #[error("Prize has {remaining} left but {requested} winners were requested")]
    InsufficientQuantity { requested: usize, remaining: u32 },

    #[error("Only {available} eligible candidates for {requested} reels")]
    NotEnoughCandidates { requested: usize, available: usize },

    #[error("A draw is already in progress")]
    DrawInProgress,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Roster error: {0}")]
    Roster(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Validation failures are shown to the operator and leave no partial state
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyPool
                | Error::NoPrizeSelected
                | Error::PrizeExhausted(_)
                | Error::InsufficientQuantity { .. }
                | Error::NotEnoughCandidates { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors() {
        assert!(Error::EmptyPool.is_validation());
        assert!(Error::PrizeExhausted("Mug".into()).is_validation());
        assert!(!Error::DrawInProgress.is_validation());
        assert!(!Error::Config("bad".into()).is_validation());
    }
}
