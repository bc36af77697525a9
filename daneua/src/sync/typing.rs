//! Typing indicator driven by ephemeral signals.

use crate::config::TYPING_INDICATOR_TIMEOUT;
use std::time::Duration;
use tokio::time::Instant;

/// Shows the partner as typing until `timeout` passes without a new signal
#[derive(Debug, Clone)]
pub struct TypingIndicator {
    timeout: Duration,
    last_signal: Option<Instant>,
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new(TYPING_INDICATOR_TIMEOUT)
    }
}

impl TypingIndicator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_signal: None,
        }
    }

    pub fn observe(&mut self, at: Instant) {
        self.last_signal = Some(at);
    }

    pub fn is_typing(&self, now: Instant) -> bool {
        self.last_signal
            .is_some_and(|last| now.saturating_duration_since(last) < self.timeout)
    }

    pub fn clear(&mut self) {
        self.last_signal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_indicator_expires_after_timeout() {
        let mut indicator = TypingIndicator::default();
        assert!(!indicator.is_typing(Instant::now()));

        indicator.observe(Instant::now());
        assert!(indicator.is_typing(Instant::now()));

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert!(indicator.is_typing(Instant::now()));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(!indicator.is_typing(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_signal_extends_indicator() {
        let mut indicator = TypingIndicator::new(Duration::from_secs(2));
        indicator.observe(Instant::now());

        tokio::time::advance(Duration::from_millis(1_900)).await;
        indicator.observe(Instant::now());
        tokio::time::advance(Duration::from_millis(1_900)).await;

        assert!(indicator.is_typing(Instant::now()));

        indicator.clear();
        assert!(!indicator.is_typing(Instant::now()));
    }
}
