//! Spinner shown while a participant is thinking

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A single spinner line; a no-op when disabled (`--quiet`).
pub struct TurnSpinner {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl TurnSpinner {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Show `message`, replacing whatever the spinner said before.
    pub fn start(&mut self, message: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let message = message.into();
        match &self.bar {
            Some(bar) => bar.set_message(message),
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(Self::style());
                bar.set_message(message);
                bar.enable_steady_tick(Duration::from_millis(100));
                self.bar = Some(bar);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.bar.is_some()
    }

    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for TurnSpinner {
    fn drop(&mut self) {
        self.clear();
    }
}
