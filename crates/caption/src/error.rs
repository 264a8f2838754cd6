//! Caption error types

/// Caption result type
pub type Result<T> = std::result::Result<T, Error>;

/// Caption generation errors. None of these reach the operator: the
/// dispatcher swaps any failure for the fallback caption.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Generator returned no text")]
    EmptyResponse,

    #[error("Caption request timed out")]
    Timeout,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}
