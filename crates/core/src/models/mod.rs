//! Data models for the draw

mod candidate;
mod prize;
mod win_record;

pub use candidate::*;
pub use prize::*;
pub use win_record::*;
