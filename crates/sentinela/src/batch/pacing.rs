//! Spacing between consecutive activation calls.

use std::time::Duration;

/// Delay policy applied between two activation calls, never before the first
/// or after the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacer {
    #[default]
    None,
    Fixed(Duration),
}

impl Pacer {
    pub fn none() -> Self {
        Pacer::None
    }

    pub fn fixed(delay: Duration) -> Self {
        if delay.is_zero() {
            Pacer::None
        } else {
            Pacer::Fixed(delay)
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::fixed(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Option<Duration> {
        match self {
            Pacer::None => None,
            Pacer::Fixed(delay) => Some(*delay),
        }
    }

    /// Waits out the delay, if any.
    pub async fn pause(&self) {
        if let Some(delay) = self.delay() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl From<&crate::config::BatchConfig> for Pacer {
    fn from(config: &crate::config::BatchConfig) -> Self {
        Pacer::from_millis(config.pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatchConfig;

    #[test]
    fn test_zero_duration_is_none() {
        assert_eq!(Pacer::fixed(Duration::ZERO), Pacer::None);
        assert_eq!(Pacer::from_millis(0).delay(), None);
    }

    #[test]
    fn test_from_config() {
        let pacer = Pacer::from(&BatchConfig::default());
        assert_eq!(pacer.delay(), Some(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_for_delay() {
        let start = tokio::time::Instant::now();
        Pacer::fixed(Duration::from_millis(750)).pause().await;
        assert!(start.elapsed() >= Duration::from_millis(750));

        let start = tokio::time::Instant::now();
        Pacer::none().pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
