//! Caption generator trait and the offline template generator
//!
//! Templates stay short and upbeat. Headline prizes get the loudest lines.

use async_trait::async_trait;
use luckydraw_core::Candidate;
use rand::seq::SliceRandom;

use crate::error::Result;

/// Produces one congratulation caption per winner
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn generate(&self, candidate: &Candidate, prize_name: &str) -> Result<String>;
}

/// Caption used whenever a generator fails or times out
pub fn fallback_caption(name: &str, prize_name: &str) -> String {
    format!("Congratulations {} on winning {}!", name, prize_name)
}

/// Prize names that mark the top of the bill
fn is_headline_prize(prize_name: &str) -> bool {
    let lower = prize_name.to_lowercase();
    ["grand", "special", "first", "jackpot"]
        .iter()
        .any(|word| lower.contains(word))
}

/// Offline caption generator
#[derive(Debug, Default, Clone)]
pub struct TemplateCaptions;

impl TemplateCaptions {
    pub fn new() -> Self {
        Self
    }

    fn compose(&self, candidate: &Candidate, prize_name: &str) -> String {
        let mut rng = rand::thread_rng();
        let name = candidate.name.as_str();

        if is_headline_prize(prize_name) {
            let templates = [
                format!("{} takes the {}! The biggest moment of the night!", name, prize_name),
                format!("Stop everything: {} just won the {}!", name, prize_name),
            ];
            return templates
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| fallback_caption(name, prize_name));
        }

        let mut templates = vec![
            format!("{} takes home the {}. Congratulations!", name, prize_name),
            format!("A big round of applause for {}, winner of the {}!", name, prize_name),
            format!("The {} goes to {}. Well deserved!", prize_name, name),
        ];
        if let Some(department) = candidate.department.as_deref().filter(|d| !d.trim().is_empty()) {
            templates.push(format!(
                "{} is celebrating tonight: {} just won the {}!",
                department, name, prize_name
            ));
        }
        templates
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| fallback_caption(name, prize_name))
    }
}

#[async_trait]
impl CaptionGenerator for TemplateCaptions {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, candidate: &Candidate, prize_name: &str) -> Result<String> {
        Ok(self.compose(candidate, prize_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_caption() {
        assert_eq!(
            fallback_caption("Ada", "Headphones"),
            "Congratulations Ada on winning Headphones!"
        );
    }

    #[test]
    fn test_headline_prize() {
        assert!(is_headline_prize("Grand Prize"));
        assert!(is_headline_prize("SPECIAL award"));
        assert!(!is_headline_prize("Coffee mug"));
    }

    #[tokio::test]
    async fn test_template_mentions_winner_and_prize() {
        let generator = TemplateCaptions::new();
        let candidate = Candidate::new("Ada", "ada@example.com").with_department("Engineering");

        for _ in 0..20 {
            let caption = generator.generate(&candidate, "Coffee mug").await.unwrap();
            assert!(caption.contains("Ada"));
            assert!(caption.contains("Coffee mug"));
        }
    }
}
