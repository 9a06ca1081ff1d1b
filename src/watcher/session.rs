//! The watch session loop.
//!
//! One coordinating task per call multiplexes cancellation, source events and
//! debounce settlements. Any source error tears the whole session down and a
//! fresh one is opened after the retry delay; only configuration errors and
//! cancellation end the loop.
//!
//! ```text
//! OPENING --ok--> WATCHING --event--> WATCHING
//!    ^               |  \--cancel--> TERMINATED
//!    |             error
//!    +--retry delay--+   (cancel during the wait -> TERMINATED)
//! ```

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::filter::TargetFilter;
use super::options::{
    DEFAULT_DEBOUNCE, DEFAULT_RETRY_DELAY, ErrorFn, EventFn, MultiWatchConfig, PathChangeFn,
    SelfMonitorConfig, WatchConfig, or_default,
};
use super::path_registry::PathRegistry;
use super::source::{EventSession, EventSource, NotifySource};

/// Watch a single file until `cancel` fires.
///
/// Returns `Ok(())` on cancellation. Configuration problems are returned
/// before any session is opened; every other failure is retried.
pub async fn watch(config: WatchConfig, cancel: CancellationToken) -> Result<(), WatchError> {
    watch_with(NotifySource::new(), config, cancel).await
}

/// [`watch`] over a caller-supplied event source.
pub async fn watch_with<S: EventSource>(
    source: S,
    config: WatchConfig,
    cancel: CancellationToken,
) -> Result<(), WatchError> {
    SessionLoop::single(source, config)?.run(cancel).await
}

/// Watch several files until `cancel` fires.
pub async fn watch_multiple(
    config: MultiWatchConfig,
    cancel: CancellationToken,
) -> Result<(), WatchError> {
    watch_multiple_with(NotifySource::new(), config, cancel).await
}

/// [`watch_multiple`] over a caller-supplied event source.
pub async fn watch_multiple_with<S: EventSource>(
    source: S,
    config: MultiWatchConfig,
    cancel: CancellationToken,
) -> Result<(), WatchError> {
    SessionLoop::multiple(source, config)?.run(cancel).await
}

/// Watch the running executable and call `on_reload` when it is replaced.
///
/// Failing to resolve the executable path is fatal and never retried.
pub async fn self_monitor(
    config: SelfMonitorConfig,
    cancel: CancellationToken,
) -> Result<(), WatchError> {
    let executable = std::env::current_exe().map_err(|e| WatchError::SelfPath {
        reason: e.to_string(),
    })?;
    crate::debug_event!("self-monitor", "resolved", "{}", executable.display());
    watch(config.into_watch_config(executable), cancel).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Single,
    Multiple,
}

/// Why a watching session ended.
enum SessionEnd {
    Cancelled,
    Failed(WatchError),
}

/// Fans loop activity out to the caller's callbacks and to tracing.
struct Notifier {
    on_change: PathChangeFn,
    on_event: Option<EventFn>,
    on_error: Option<ErrorFn>,
}

impl Notifier {
    fn event(&mut self, message: &str) {
        tracing::debug!("[watcher] {message}");
        if let Some(on_event) = self.on_event.as_mut() {
            on_event(message);
        }
    }

    fn error(&mut self, err: &WatchError) {
        tracing::warn!("[watcher] {err}");
        if let Some(on_error) = self.on_error.as_mut() {
            on_error(err);
        }
    }
}

struct SessionLoop<S> {
    source: S,
    filter: TargetFilter,
    debounce: Duration,
    retry_delay: Duration,
    notifier: Notifier,
    mode: Mode,
    /// Targets as passed by the caller, duplicates included.
    requested: usize,
}

impl<S: EventSource> SessionLoop<S> {
    fn single(source: S, config: WatchConfig) -> Result<Self, WatchError> {
        let mut on_change = config.on_change.ok_or(WatchError::MissingOnChange)?;
        if config.target_file.as_os_str().is_empty() {
            return Err(WatchError::NoTargets);
        }

        Ok(Self {
            source,
            filter: TargetFilter::new(PathRegistry::new([config.target_file])),
            debounce: or_default(config.debounce, DEFAULT_DEBOUNCE),
            retry_delay: or_default(config.retry_delay, DEFAULT_RETRY_DELAY),
            notifier: Notifier {
                on_change: Box::new(move |_: &Path| on_change()),
                on_event: config.on_event,
                on_error: config.on_error,
            },
            mode: Mode::Single,
            requested: 1,
        })
    }

    fn multiple(source: S, config: MultiWatchConfig) -> Result<Self, WatchError> {
        let on_change = config.on_change.ok_or(WatchError::MissingOnChange)?;
        let requested = config.target_files.len();
        let registry = PathRegistry::new(config.target_files);
        if registry.is_empty() {
            return Err(WatchError::NoTargets);
        }

        Ok(Self {
            source,
            filter: TargetFilter::new(registry),
            debounce: or_default(config.debounce, DEFAULT_DEBOUNCE),
            retry_delay: or_default(config.retry_delay, DEFAULT_RETRY_DELAY),
            notifier: Notifier {
                on_change,
                on_event: config.on_event,
                on_error: config.on_error,
            },
            mode: Mode::Multiple,
            requested,
        })
    }

    async fn run(mut self, cancel: CancellationToken) -> Result<(), WatchError> {
        self.announce();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match self.open_session() {
                Ok(mut session) => {
                    let end = self.watch_session(&mut session, &cancel).await;
                    session.close();
                    match end {
                        SessionEnd::Cancelled => break,
                        SessionEnd::Failed(err) => {
                            self.notifier.error(&err);
                            crate::log_event!("watcher", "session lost", "recreating");
                        }
                    }
                }
                Err(err) => self.notifier.error(&err),
            }

            if !wait_retry(self.retry_delay, &cancel).await {
                break;
            }
        }

        crate::log_event!("watcher", "stopped");
        Ok(())
    }

    fn announce(&mut self) {
        let registry = self.filter.registry();
        if self.mode == Mode::Multiple {
            let message = format!(
                "watching {} files across {} directories",
                self.requested,
                registry.dir_count()
            );
            self.notifier.event(&message);
        }
        crate::log_event!(
            "watcher",
            "started",
            "{} targets, debounce {:?}, retry {:?}",
            registry.target_count(),
            self.debounce,
            self.retry_delay
        );
    }

    /// OPENING: create a session and register every target directory.
    fn open_session(&mut self) -> Result<S::Session, WatchError> {
        let mut session = self.source.open()?;

        for dir in self.filter.registry().watch_dirs() {
            if let Err(err) = session.add_watch(dir) {
                session.close();
                return Err(err);
            }
            let message = match self.mode {
                Mode::Single => format!("watching {}", dir.display()),
                Mode::Multiple => format!("watching directory: {}", dir.display()),
            };
            self.notifier.event(&message);
        }

        Ok(session)
    }

    /// WATCHING: race cancellation, settlements and source activity.
    async fn watch_session(
        &mut self,
        session: &mut S::Session,
        cancel: &CancellationToken,
    ) -> SessionEnd {
        let (debouncer, mut settled) = Debouncer::new(self.debounce);

        let end = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break SessionEnd::Cancelled,

                Some(target) = settled.recv() => self.settle(&target),

                received = session.recv() => match received {
                    Some(Ok(event)) => match self.filter.matches(&event) {
                        Some(target) => {
                            let message = format!("change detected: {event}");
                            self.notifier.event(&message);
                            debouncer.record(target);
                        }
                        None => {
                            crate::debug_event!("watcher", "ignored", "{event}");
                        }
                    },
                    Some(Err(err)) => break SessionEnd::Failed(err),
                    None => break SessionEnd::Failed(WatchError::ChannelClosed),
                },
            }
        };

        if debouncer.has_pending() {
            crate::debug_event!(
                "watcher",
                "discarding",
                "{} pending settlements",
                debouncer.pending_count()
            );
        }
        debouncer.cancel_all();
        end
    }

    fn settle(&mut self, target: &Path) {
        let message = match self.mode {
            Mode::Single => "sending signal".to_string(),
            Mode::Multiple => format!("sending signal for: {}", target.display()),
        };
        self.notifier.event(&message);
        crate::log_event!("watcher", "changed", "{}", target.display());
        (self.notifier.on_change)(target);
    }
}

/// Wait out the retry delay. Returns false if cancelled first.
async fn wait_retry(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
