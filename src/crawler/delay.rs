//! Jittered politeness delays between outbound requests

use rand::Rng;
use std::time::Duration;

use crate::config::DelayRange;

/// Sleeps a uniformly random duration within a configured range
#[derive(Debug, Clone, Copy)]
pub struct JitterDelay {
    range: DelayRange,
}

impl JitterDelay {
    pub fn new(range: DelayRange) -> Self {
        Self { range }
    }

    /// Delay that never sleeps, for tests
    pub fn none() -> Self {
        Self::new(DelayRange::none())
    }

    /// Pick the next delay
    pub fn sample(&self) -> Duration {
        let DelayRange { min_ms, max_ms } = self.range;
        if max_ms <= min_ms {
            return Duration::from_millis(min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl From<DelayRange> for JitterDelay {
    fn from(range: DelayRange) -> Self {
        Self::new(range)
    }
}
