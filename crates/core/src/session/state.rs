use serde::{Deserialize, Serialize};

/// Session-level draw state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawState {
    /// Roster and prizes are being prepared
    Setup,
    /// Waiting for the operator to start a draw
    Ready,
    /// Reels are spinning or landing
    Spinning,
    /// Winners on screen, waiting for confirm or reroll
    WinnerShown,
    /// No further draw is possible with the current roster and stock
    Finished,
}

impl DrawState {
    /// A draw is on stage and must be resolved before anything else
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawState::Spinning | DrawState::WinnerShown)
    }
}
