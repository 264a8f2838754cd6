//! Lucky Draw Caption Library
//!
//! Congratulation captions for revealed winners.
//!
//! # Architecture
//!
//! - **Generator**: async trait producing one caption per winner
//! - **Templates**: offline generator, also the source of the fallback text
//! - **Gemini**: hosted LLM generator over HTTP
//! - **Dispatcher**: runs requests on detached tasks and reports results
//!   keyed by win record id
//!
//! # Usage
//!
//! ```ignore
//! let (dispatcher, mut results) = CaptionDispatcher::new(generator, Duration::from_secs(8));
//! dispatcher.request(request);
//!
//! while let Ok(result) = results.try_recv() {
//!     session.apply_caption(result.win_id, result.caption);
//! }
//! ```

pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod generator;

pub use dispatcher::{CaptionDispatcher, CaptionResult};
pub use error::{Error, Result};
pub use gemini::GeminiCaptions;
pub use generator::{fallback_caption, CaptionGenerator, TemplateCaptions};
