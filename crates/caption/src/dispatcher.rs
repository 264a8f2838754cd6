//! Detached caption requests
//!
//! Each request runs on its own task so a slow or failing generator never
//! holds up the reels. Results come back on a channel keyed by win record id;
//! the session decides whether the record still exists.

use std::sync::Arc;
use std::time::Duration;

use luckydraw_core::CaptionRequest;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::generator::{fallback_caption, CaptionGenerator};

/// Caption for one win record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub win_id: Uuid,
    pub caption: String,
    /// True when the generator failed and the fallback text was used
    pub fallback: bool,
}

/// Runs caption requests in the background
#[derive(Clone)]
pub struct CaptionDispatcher {
    generator: Arc<dyn CaptionGenerator>,
    timeout: Duration,
    result_tx: mpsc::Sender<CaptionResult>,
}

impl CaptionDispatcher {
    pub fn new(
        generator: Arc<dyn CaptionGenerator>,
        timeout: Duration,
    ) -> (Self, mpsc::Receiver<CaptionResult>) {
        let (result_tx, result_rx) = mpsc::channel(64);
        (
            Self {
                generator,
                timeout,
                result_tx,
            },
            result_rx,
        )
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Spawn a caption task. Must be called inside a tokio runtime.
    pub fn request(&self, request: CaptionRequest) -> JoinHandle<()> {
        let generator = self.generator.clone();
        let timeout = self.timeout;
        let result_tx = self.result_tx.clone();

        tokio::spawn(async move {
            let CaptionRequest {
                win_id,
                candidate,
                prize_name,
            } = request;

            let outcome =
                tokio::time::timeout(timeout, generator.generate(&candidate, &prize_name)).await;
            let caption = match outcome {
                Ok(Ok(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
                Ok(Ok(_)) => Err(Error::EmptyResponse),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(Error::Timeout),
            };

            let result = match caption {
                Ok(caption) => CaptionResult {
                    win_id,
                    caption,
                    fallback: false,
                },
                Err(e) => {
                    warn!(
                        win = %win_id,
                        generator = generator.name(),
                        error = %e,
                        "Caption failed, using fallback"
                    );
                    CaptionResult {
                        win_id,
                        caption: fallback_caption(&candidate.name, &prize_name),
                        fallback: true,
                    }
                }
            };

            if result_tx.send(result).await.is_err() {
                debug!(win = %win_id, "Caption receiver closed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use luckydraw_core::Candidate;

    use super::*;
    use crate::error::Result;
    use crate::generator::TemplateCaptions;

    struct Failing;

    #[async_trait]
    impl CaptionGenerator for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _: &Candidate, _: &str) -> Result<String> {
            Err(Error::MissingApiKey)
        }
    }

    struct Slow;

    #[async_trait]
    impl CaptionGenerator for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _: &Candidate, _: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("Too late".into())
        }
    }

    struct Blank;

    #[async_trait]
    impl CaptionGenerator for Blank {
        fn name(&self) -> &str {
            "blank"
        }

        async fn generate(&self, _: &Candidate, _: &str) -> Result<String> {
            Ok("   ".into())
        }
    }

    fn request() -> CaptionRequest {
        CaptionRequest {
            win_id: Uuid::new_v4(),
            candidate: Candidate::new("Ada", "ada@example.com"),
            prize_name: "Mug".into(),
        }
    }

    #[tokio::test]
    async fn test_generated_caption() {
        let (dispatcher, mut results) =
            CaptionDispatcher::new(Arc::new(TemplateCaptions::new()), Duration::from_secs(5));
        let req = request();
        let win_id = req.win_id;

        dispatcher.request(req).await.unwrap();
        let result = results.recv().await.unwrap();
        assert_eq!(result.win_id, win_id);
        assert!(!result.fallback);
        assert!(result.caption.contains("Ada"));
    }

    #[tokio::test]
    async fn test_failure_uses_fallback() {
        let (dispatcher, mut results) =
            CaptionDispatcher::new(Arc::new(Failing), Duration::from_secs(5));
        dispatcher.request(request()).await.unwrap();

        let result = results.recv().await.unwrap();
        assert!(result.fallback);
        assert_eq!(result.caption, "Congratulations Ada on winning Mug!");
    }

    #[tokio::test]
    async fn test_timeout_uses_fallback() {
        let (dispatcher, mut results) =
            CaptionDispatcher::new(Arc::new(Slow), Duration::from_millis(20));
        dispatcher.request(request()).await.unwrap();

        let result = results.recv().await.unwrap();
        assert!(result.fallback);
    }

    #[tokio::test]
    async fn test_blank_text_uses_fallback() {
        let (dispatcher, mut results) =
            CaptionDispatcher::new(Arc::new(Blank), Duration::from_secs(5));
        dispatcher.request(request()).await.unwrap();

        assert!(results.recv().await.unwrap().fallback);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_quiet() {
        let (dispatcher, results) =
            CaptionDispatcher::new(Arc::new(TemplateCaptions::new()), Duration::from_secs(5));
        drop(results);
        dispatcher.request(request()).await.unwrap();
    }
}
