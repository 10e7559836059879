// ABOUTME: Outer turn handling - generate a response, then process its directives.
// ABOUTME: The whole turn races a single timeout; tool failures never fail the turn.

use std::time::Duration;

use async_trait::async_trait;

use super::{Orchestrator, Processed};
use crate::error::TurnError;

/// Anything that turns a prompt into generated text, one string per turn.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

impl Orchestrator {
    /// Generate a response for `prompt` and run every directive in it,
    /// giving up on the whole turn after `timeout`.
    ///
    /// A shell command still running when the turn is abandoned is left to
    /// its own timeout.
    pub async fn run_turn<G>(
        &self,
        generator: &G,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Processed, TurnError>
    where
        G: Generator + ?Sized,
    {
        let turn = async {
            let text = generator
                .generate(prompt)
                .await
                .map_err(TurnError::Generator)?;
            Ok(self.process(&text).await)
        };

        match tokio::time::timeout(timeout, turn).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "turn timed out");
                Err(TurnError::Timeout(timeout))
            }
        }
    }
}
