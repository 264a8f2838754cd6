//! Lucky Draw Core Library
//!
//! Candidate pool, fair winner selection, reel choreography, and the draw
//! session state machine. No async runtime and no rendering: the host drives
//! the session's virtual clock and renders the reel snapshots it exposes.

pub mod coordinator;
pub mod easing;
pub mod effects;
pub mod error;
pub mod export;
pub mod invariants;
pub mod models;
pub mod pool;
pub mod random;
pub mod reel;
pub mod roster;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod settings;

pub use coordinator::{DrawOutcome, ReelCoordinator};
pub use easing::Easing;
pub use effects::{CaptionRequest, Cue, Effect, SessionEvent};
pub use error::{Error, Result};
pub use export::{export_rows, write_export, ExportRow};
pub use models::*;
pub use random::{RandomSource, RngSource};
pub use reel::{HighlightKind, ReelPhase, ReelView, VisibleItem};
pub use roster::Roster;
pub use scheduler::{DrawTimer, Scheduler, TimerToken};
pub use session::{DrawSession, DrawState};
pub use settings::{ReelLayout, SessionSettings, SlotTiming, MAX_REELS};
