//! CLI commands and terminal output

mod run;
mod style;

pub use run::{run_once_command, run_scheduled};

use async_trait::async_trait;
use pr_autopilot::progress::ProgressCallback;
use style::Stylize;

/// Progress reporter that prints styled lines to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        anstream::println!("{message}");
    }

    async fn on_success(&self, message: &str) {
        anstream::println!("{}", message.success());
    }

    async fn on_warning(&self, message: &str) {
        anstream::println!("{}", message.warn());
    }

    async fn on_error(&self, message: &str) {
        anstream::println!("{}", message.error());
    }
}
