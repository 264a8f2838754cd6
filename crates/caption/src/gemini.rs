//! Gemini caption generator
//!
//! Calls the `generateContent` endpoint with a single text prompt and takes
//! the first candidate's first text part.

use async_trait::async_trait;
use luckydraw_core::Candidate;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::generator::CaptionGenerator;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked for the API key, in order
const KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub struct GeminiCaptions {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiCaptions {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Build from the environment. Fails with `MissingApiKey` when no key
    /// variable holds a non-blank value.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = api_key(|var| std::env::var(var).ok()).ok_or(Error::MissingApiKey)?;
        Ok(Self::new(api_key, model))
    }

    /// Point at a different base URL (proxies, regional endpoints)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

/// Prompt for one winner
pub fn prompt(candidate: &Candidate, prize_name: &str) -> String {
    let mut details = format!("- Name: {}\n- Email: {}\n", candidate.name, candidate.email);
    if let Some(department) = candidate.department.as_deref() {
        details.push_str(&format!("- Department: {}\n", department));
    }

    format!(
        "Write a lively, funny, personal congratulation for an employee who just won a prize \
         at the year-end party.\n\n\
         Employee:\n{}\
         Prize: {}\n\n\
         Rules:\n\
         - Play on the name or department to make it feel personal.\n\
         - Tone: bursting with energy, warm, friendly.\n\
         - At most 2 sentences.\n\
         - For a grand, special or first prize, turn the excitement all the way up.\n\
         - Return only the message, no explanations.",
        details, prize_name
    )
}

/// First text part of the first candidate
pub fn extract_text(response: &serde_json::Value) -> Option<String> {
    response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[async_trait]
impl CaptionGenerator for GeminiCaptions {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, candidate: &Candidate, prize_name: &str) -> Result<String> {
        debug!(model = %self.model, winner = %candidate.name, "Requesting caption");

        let response = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": prompt(candidate, prize_name) }]
                }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        extract_text(&json).ok_or(Error::EmptyResponse)
    }
}

/// First non-blank key among `KEY_VARS`
fn api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    KEY_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|key| !key.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_includes_model_and_key() {
        let generator = GeminiCaptions::new("secret", "gemini-test").with_endpoint("http://localhost:9/");
        assert_eq!(
            generator.url(),
            "http://localhost:9/models/gemini-test:generateContent?key=secret"
        );
    }

    #[test]
    fn test_blank_key_falls_through() {
        let key = api_key(|var| match var {
            "GEMINI_API_KEY" => Some("  ".into()),
            "API_KEY" => Some("fallback".into()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("fallback"));

        let first = api_key(|var| Some(format!("{}-value", var)));
        assert_eq!(first.as_deref(), Some("GEMINI_API_KEY-value"));

        assert!(api_key(|_| None).is_none());
    }

    #[test]
    fn test_prompt_lists_department() {
        let candidate = Candidate::new("Ada", "ada@example.com").with_department("Engineering");
        let text = prompt(&candidate, "Grand Prize");
        assert!(text.contains("- Name: Ada"));
        assert!(text.contains("- Department: Engineering"));
        assert!(text.contains("Prize: Grand Prize"));

        let plain = prompt(&Candidate::new("Bo", "bo@example.com"), "Mug");
        assert!(!plain.contains("Department"));
    }

    #[test]
    fn test_extract_text() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Well done, Ada!  " }] }
            }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("Well done, Ada!"));

        assert!(extract_text(&json!({ "candidates": [] })).is_none());
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": " " }] } }] });
        assert!(extract_text(&blank).is_none());
    }
}
