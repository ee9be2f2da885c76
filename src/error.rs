use thiserror::Error;

use crate::webdriver::DriverError;

/// Top-level failure taxonomy for the triage loop.
///
/// Only `Startup` is fatal. `SessionLost` is recovered by full session
/// teardown, backoff, and re-login; `Cycle` is logged and retried in the
/// same session after a backoff. Persistence failures never appear here:
/// the memory store and the log sinks swallow their own I/O errors at the
/// call site (best-effort durability, accepted in the design).
#[derive(Debug, Error)]
pub enum SnowwatchError {
    #[error("startup failure: {0}")]
    Startup(String),

    #[error("automation session lost: {0}")]
    SessionLost(#[source] DriverError),

    #[error("cycle error: {0}")]
    Cycle(#[source] DriverError),
}

impl SnowwatchError {
    /// Classify a driver error into the recovery path it requires.
    pub fn from_driver(e: DriverError) -> Self {
        if e.is_session_loss() {
            SnowwatchError::SessionLost(e)
        } else {
            SnowwatchError::Cycle(e)
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SnowwatchError::Startup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_session_classifies_as_session_loss() {
        let err = SnowwatchError::from_driver(DriverError::InvalidSession);
        assert!(matches!(err, SnowwatchError::SessionLost(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn element_timeout_classifies_as_cycle_error() {
        let err = SnowwatchError::from_driver(DriverError::Timeout("ticket form".into()));
        assert!(matches!(err, SnowwatchError::Cycle(_)));
    }

    #[test]
    fn startup_is_the_only_fatal_kind() {
        assert!(SnowwatchError::Startup("credentials missing".into()).is_fatal());
        assert!(!SnowwatchError::from_driver(DriverError::StaleElement).is_fatal());
    }
}
