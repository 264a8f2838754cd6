//! Presentation cues and session events
//!
//! The session never plays audio or draws particles itself. It queues named
//! triggers in an outbox and the host drains them each frame.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Candidate;
use crate::session::DrawState;
use crate::settings::SessionSettings;

/// Named moments in a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    SpinStart,
    SpinStop,
    WinnerRevealed,
    UiClick,
}

/// Effect the host should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Sound(Cue),
    Confetti,
}

impl Effect {
    /// Whether the operator's toggles allow this effect
    pub fn enabled(&self, settings: &SessionSettings) -> bool {
        match self {
            Effect::Sound(_) => settings.sound_enabled,
            Effect::Confetti => settings.confetti_enabled,
        }
    }
}

/// Request for a congratulation caption, keyed by the pending record
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub win_id: Uuid,
    pub candidate: Candidate,
    pub prize_name: String,
}

/// Outbox entry
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Effect(Effect),
    CaptionRequested(CaptionRequest),
    StateChanged { from: DrawState, to: DrawState },
}
