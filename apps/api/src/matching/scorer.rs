//! Match Scorer: pluggable, trait-based seam around the language model.
//!
//! Production: `LlmMatchScorer` (chat-completions call via `LlmClient`).
//! Tests: any fake returning canned text.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`; nothing reaches for a global model.

use async_trait::async_trait;

use crate::llm_client::prompts::MATCHING_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

/// Turns one prompt into one free-text response. Model choice, sampling and
/// transport retries are the implementation's business.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short label for health output and logs.
    fn backend(&self) -> String;
}

pub struct LlmMatchScorer(pub LlmClient);

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(&self, prompt: &str) -> Result<String, LlmError> {
        self.0.call_text(prompt, MATCHING_SYSTEM).await
    }

    fn backend(&self) -> String {
        format!("llm:{}", self.0.model())
    }
}

#[cfg(test)]
pub mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Returns a fixed response and records every prompt it receives.
    #[derive(Default)]
    pub struct FakeScorer {
        response: String,
        fail: bool,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeScorer {
        pub fn responding(response: &str) -> Self {
            Self {
                response: response.to_string(),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl MatchScorer for FakeScorer {
        async fn score(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(LlmError::Api {
                    status: 503,
                    message: "model server unavailable".to_string(),
                });
            }
            Ok(self.response.clone())
        }

        fn backend(&self) -> String {
            "fake".to_string()
        }
    }
}
