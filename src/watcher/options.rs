//! Caller-facing watch configurations.
//!
//! Callbacks are boxed closures set through builder-style methods. Only the
//! change callback is required; leaving it unset is reported as
//! [`WatchError::MissingOnChange`](super::WatchError::MissingOnChange) before
//! anything is watched.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::WatchError;

/// Default time a target must stay quiet before the change callback fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(3);
/// Default wait before a failed watch session is recreated.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

pub type ChangeFn = Box<dyn FnMut() + Send>;
pub type PathChangeFn = Box<dyn FnMut(&Path) + Send>;
pub type EventFn = Box<dyn FnMut(&str) + Send>;
pub type ErrorFn = Box<dyn FnMut(&WatchError) + Send>;

/// Zero means "use the default".
pub(crate) fn or_default(value: Duration, default: Duration) -> Duration {
    if value.is_zero() { default } else { value }
}

/// Watch a single file.
pub struct WatchConfig {
    /// Absolute path of the file to watch.
    pub target_file: PathBuf,
    /// Quiet period before `on_change` fires (zero: 3s).
    pub debounce: Duration,
    /// Wait before recreating a failed session (zero: 2s).
    pub retry_delay: Duration,
    pub on_change: Option<ChangeFn>,
    pub on_event: Option<EventFn>,
    pub on_error: Option<ErrorFn>,
}

impl WatchConfig {
    pub fn new(target_file: impl Into<PathBuf>) -> Self {
        Self {
            target_file: target_file.into(),
            debounce: Duration::ZERO,
            retry_delay: Duration::ZERO,
            on_change: None,
            on_event: None,
            on_error: None,
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Called once per settled burst of changes.
    pub fn on_change(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Advisory status messages ("watching ...", "change detected: ...").
    pub fn on_event(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(f));
        self
    }

    /// Transient failures that triggered a retry.
    pub fn on_error(mut self, f: impl FnMut(&WatchError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("target_file", &self.target_file)
            .field("debounce", &self.debounce)
            .field("retry_delay", &self.retry_delay)
            .field("on_change", &self.on_change.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Watch several files, possibly spread across directories.
pub struct MultiWatchConfig {
    /// Absolute paths of the files to watch.
    pub target_files: Vec<PathBuf>,
    pub debounce: Duration,
    pub retry_delay: Duration,
    /// Receives the path of the target that settled.
    pub on_change: Option<PathChangeFn>,
    pub on_event: Option<EventFn>,
    pub on_error: Option<ErrorFn>,
}

impl MultiWatchConfig {
    pub fn new<I, P>(target_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            target_files: target_files.into_iter().map(Into::into).collect(),
            debounce: Duration::ZERO,
            retry_delay: Duration::ZERO,
            on_change: None,
            on_event: None,
            on_error: None,
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn on_change(mut self, f: impl FnMut(&Path) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_event(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&WatchError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for MultiWatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiWatchConfig")
            .field("target_files", &self.target_files)
            .field("debounce", &self.debounce)
            .field("retry_delay", &self.retry_delay)
            .field("on_change", &self.on_change.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Watch the running executable itself.
pub struct SelfMonitorConfig {
    pub debounce: Duration,
    pub retry_delay: Duration,
    /// Called when the executable has been replaced (required).
    pub on_reload: Option<ChangeFn>,
    pub on_event: Option<EventFn>,
    pub on_error: Option<ErrorFn>,
}

impl SelfMonitorConfig {
    pub fn new() -> Self {
        Self {
            debounce: Duration::ZERO,
            retry_delay: Duration::ZERO,
            on_reload: None,
            on_event: None,
            on_error: None,
        }
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn on_reload(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_reload = Some(Box::new(f));
        self
    }

    pub fn on_event(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_event = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&WatchError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Single-target config for the resolved executable path.
    pub(crate) fn into_watch_config(self, executable: PathBuf) -> WatchConfig {
        WatchConfig {
            target_file: executable,
            debounce: self.debounce,
            retry_delay: self.retry_delay,
            on_change: self.on_reload,
            on_event: self.on_event,
            on_error: self.on_error,
        }
    }
}

impl Default for SelfMonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_durations_use_defaults() {
        assert_eq!(or_default(Duration::ZERO, DEFAULT_DEBOUNCE), Duration::from_secs(3));
        assert_eq!(
            or_default(Duration::ZERO, DEFAULT_RETRY_DELAY),
            Duration::from_secs(2)
        );
        assert_eq!(
            or_default(Duration::from_millis(50), DEFAULT_DEBOUNCE),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_builder_sets_callbacks() {
        let config = WatchConfig::new("/srv/app")
            .debounce(Duration::from_millis(500))
            .on_change(|| {});

        assert!(config.on_change.is_some());
        assert!(config.on_event.is_none());
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert!(format!("{config:?}").contains("on_change: true"));
    }

    #[test]
    fn test_self_monitor_carries_settings() {
        let config = SelfMonitorConfig::new()
            .debounce(Duration::from_secs(5))
            .on_reload(|| {})
            .into_watch_config(PathBuf::from("/usr/local/bin/app"));

        assert_eq!(config.target_file, PathBuf::from("/usr/local/bin/app"));
        assert_eq!(config.debounce, Duration::from_secs(5));
        assert!(config.on_change.is_some());
    }
}
