//! Failure classification for board fetches
//!
//! | Kind        | Trigger                      | Verdict                       |
//! |-------------|------------------------------|-------------------------------|
//! | `NotFound`  | HTTP 404                     | disable now                   |
//! | `Transient` | timeout, DNS, connect error  | disable on the Nth occurrence |
//! | `OtherHttp` | anything else                | log only                      |
//!
//! Counters live for one process and are never shared. Retry happens on the
//! next run, not inside this one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::BoardStore;
use crate::utils::error::FetchError;

/// Transient failures tolerated before a board is disabled
pub const DEFAULT_TRANSIENT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Transient,
    OtherHttp,
}

impl FailureKind {
    /// Kind of a non-success response
    pub fn from_status(status: u16) -> Self {
        if status == 404 {
            Self::NotFound
        } else {
            Self::OtherHttp
        }
    }

    /// Kind of a transport error
    pub fn from_error(err: &FetchError) -> Self {
        match err {
            FetchError::Timeout | FetchError::Connect(_) => Self::Transient,
            FetchError::Status(code) => Self::from_status(*code),
            FetchError::Http(_) | FetchError::InvalidUrl(_) => Self::OtherHttp,
        }
    }
}

/// What to do about one failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Switch the board off
    Disable,
    /// Keep the board; `attempts` transient failures so far
    Defer { attempts: u32 },
    /// Leave the board untouched
    Ignore,
}

#[derive(Debug)]
pub struct FailureClassifier {
    counts: Mutex<HashMap<String, u32>>,
    threshold: u32,
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIENT_THRESHOLD)
    }
}

impl FailureClassifier {
    pub fn new(threshold: u32) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            threshold: threshold.max(1),
        }
    }

    /// Decide the verdict for one failure, updating the transient counter
    pub fn classify(&self, url: &str, kind: FailureKind) -> Verdict {
        match kind {
            FailureKind::NotFound => Verdict::Disable,
            FailureKind::OtherHttp => Verdict::Ignore,
            FailureKind::Transient => {
                let attempts = {
                    let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
                    let count = counts.entry(url.to_string()).or_insert(0);
                    *count += 1;
                    *count
                };
                if attempts >= self.threshold {
                    Verdict::Disable
                } else {
                    Verdict::Defer { attempts }
                }
            }
        }
    }

    /// Transient failures recorded for a URL this run
    pub fn attempts(&self, url: &str) -> u32 {
        self.counts
            .lock()
            .map(|counts| counts.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Classify a failure and apply the verdict to the store.
    ///
    /// Store errors are logged; the verdict is returned either way.
    pub async fn handle(&self, store: &dyn BoardStore, url: &str, kind: FailureKind) -> Verdict {
        let verdict = self.classify(url, kind);
        match verdict {
            Verdict::Disable => match store.set_enabled(url, false).await {
                Ok(true) => tracing::warn!(url = %url, kind = ?kind, "Disabled board"),
                Ok(false) => tracing::warn!(url = %url, kind = ?kind, "Board to disable not in store"),
                Err(e) => tracing::error!(url = %url, error = %e, "Failed to disable board"),
            },
            Verdict::Defer { attempts } => tracing::warn!(
                url = %url,
                attempts,
                threshold = self.threshold,
                "Transient failure, will retry next run"
            ),
            Verdict::Ignore => tracing::warn!(url = %url, kind = ?kind, "Fetch failed, board left enabled"),
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_error() {
        assert_eq!(FailureKind::from_error(&FetchError::Timeout), FailureKind::Transient);
        assert_eq!(
            FailureKind::from_error(&FetchError::Connect("dns".into())),
            FailureKind::Transient
        );
        assert_eq!(FailureKind::from_error(&FetchError::Status(404)), FailureKind::NotFound);
        assert_eq!(FailureKind::from_error(&FetchError::Status(500)), FailureKind::OtherHttp);
        assert_eq!(
            FailureKind::from_error(&FetchError::InvalidUrl("x".into())),
            FailureKind::OtherHttp
        );
    }

    #[test]
    fn test_not_found_disables_immediately() {
        let classifier = FailureClassifier::default();
        assert_eq!(classifier.classify("u", FailureKind::NotFound), Verdict::Disable);
    }

    #[test]
    fn test_transient_threshold() {
        let classifier = FailureClassifier::new(3);
        assert_eq!(
            classifier.classify("u", FailureKind::Transient),
            Verdict::Defer { attempts: 1 }
        );
        assert_eq!(
            classifier.classify("u", FailureKind::Transient),
            Verdict::Defer { attempts: 2 }
        );
        assert_eq!(classifier.classify("other", FailureKind::Transient), Verdict::Defer { attempts: 1 });
        assert_eq!(classifier.classify("u", FailureKind::Transient), Verdict::Disable);
        assert_eq!(classifier.attempts("u"), 3);
    }

    #[test]
    fn test_other_http_ignored() {
        let classifier = FailureClassifier::default();
        for _ in 0..5 {
            assert_eq!(classifier.classify("u", FailureKind::OtherHttp), Verdict::Ignore);
        }
        assert_eq!(classifier.attempts("u"), 0);
    }
}
