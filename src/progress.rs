//! Progress reporting for merge runs
//!
//! The merge workflow reports human-readable lines through this trait, so
//! the CLI can style them and tests can capture them.

use async_trait::async_trait;

/// Receives progress lines from a merge run
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Informational line
    async fn on_message(&self, message: &str);

    /// Positive outcome (merge or branch deletion succeeded)
    async fn on_success(&self, message: &str) {
        self.on_message(message).await;
    }

    /// Non-fatal problem
    async fn on_warning(&self, message: &str) {
        self.on_message(message).await;
    }

    /// Failed outcome
    async fn on_error(&self, message: &str) {
        self.on_message(message).await;
    }
}
