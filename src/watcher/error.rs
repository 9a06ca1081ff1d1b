//! Error types for the reload watcher.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// Configuration variants are returned from [`watch`](super::watch) and friends
/// before any session opens. Every other variant is transient: it is reported
/// through the error callback and the session is rebuilt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("OnChange callback must be set")]
    MissingOnChange,

    #[error("at least one target file must be specified")]
    NoTargets,

    #[error("Cannot resolve current executable: {reason}")]
    SelfPath { reason: String },

    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("failed to watch directory {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("File system event error: {details}")]
    EventError { details: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

impl WatchError {
    /// Whether this error ends the run instead of triggering a retry.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            WatchError::MissingOnChange | WatchError::NoTargets | WatchError::SelfPath { .. }
        )
    }
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_fatal() {
        assert!(WatchError::MissingOnChange.is_config_error());
        assert!(WatchError::NoTargets.is_config_error());
        assert!(
            WatchError::SelfPath {
                reason: "gone".to_string()
            }
            .is_config_error()
        );
        assert!(!WatchError::ChannelClosed.is_config_error());
        assert!(
            !WatchError::PathWatchFailed {
                path: PathBuf::from("/missing"),
                reason: "No such file or directory".to_string(),
            }
            .is_config_error()
        );
    }

    #[test]
    fn test_path_watch_message() {
        let err = WatchError::PathWatchFailed {
            path: PathBuf::from("/srv/app"),
            reason: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "failed to watch directory /srv/app: denied");
    }
}
