//! Scripted event source for driving the session loop in tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::error::WatchError;
use super::source::{EventSession, EventSource, RawEvent};

type Feed = mpsc::UnboundedSender<Result<RawEvent, WatchError>>;

#[derive(Debug, Default)]
struct Script {
    open_failures: usize,
    missing_dirs: HashSet<PathBuf>,
    opened: usize,
    closed: usize,
    registered: Vec<PathBuf>,
    current: Option<(usize, Feed)>,
}

/// Handle shared between a test and the loop it drives.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `open()` fail.
    pub fn fail_next_opens(&self, n: usize) {
        self.script.lock().open_failures = n;
    }

    /// Toggle whether registering `dir` fails.
    pub fn set_missing(&self, dir: impl Into<PathBuf>, missing: bool) {
        let dir = dir.into();
        let mut script = self.script.lock();
        if missing {
            script.missing_dirs.insert(dir);
        } else {
            script.missing_dirs.remove(&dir);
        }
    }

    /// Deliver an event to the live session. Returns false if none is open.
    pub fn emit(&self, event: RawEvent) -> bool {
        self.send(Ok(event))
    }

    /// Deliver an adapter error to the live session.
    pub fn fail_session(&self, err: WatchError) -> bool {
        self.send(Err(err))
    }

    /// Drop the live session's feed, ending its event stream.
    pub fn hang_up(&self) {
        self.script.lock().current = None;
    }

    fn send(&self, item: Result<RawEvent, WatchError>) -> bool {
        match &self.script.lock().current {
            Some((_, feed)) => feed.send(item).is_ok(),
            None => false,
        }
    }

    pub fn opened(&self) -> usize {
        self.script.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.script.lock().closed
    }

    pub fn is_live(&self) -> bool {
        self.script.lock().current.is_some()
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.script.lock().registered.clone()
    }
}

impl EventSource for ScriptedSource {
    type Session = ScriptedSession;

    fn open(&mut self) -> Result<ScriptedSession, WatchError> {
        let mut script = self.script.lock();
        if script.open_failures > 0 {
            script.open_failures -= 1;
            return Err(WatchError::InitFailed {
                reason: "too many open files".to_string(),
            });
        }

        script.opened += 1;
        let id = script.opened;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(ScriptedSession {
            id,
            script: Arc::clone(&self.script),
            rx,
            pending_feed: Some(tx),
            closed: false,
        })
    }
}

/// Session handed out by [`ScriptedSource`].
///
/// The feed only becomes visible to the test once every directory registered,
/// matching a real watcher that reports nothing before `add_watch`.
pub(crate) struct ScriptedSession {
    id: usize,
    script: Arc<Mutex<Script>>,
    rx: mpsc::UnboundedReceiver<Result<RawEvent, WatchError>>,
    pending_feed: Option<Feed>,
    closed: bool,
}

#[async_trait]
impl EventSession for ScriptedSession {
    fn add_watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        let mut script = self.script.lock();
        if script.missing_dirs.contains(dir) {
            return Err(WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: "No such file or directory".to_string(),
            });
        }
        script.registered.push(dir.to_path_buf());
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<RawEvent, WatchError>> {
        if let Some(feed) = self.pending_feed.take() {
            self.script.lock().current = Some((self.id, feed));
        }
        self.rx.recv().await
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.pending_feed = None;
        self.rx.close();

        let mut script = self.script.lock();
        script.closed += 1;
        if matches!(script.current, Some((id, _)) if id == self.id) {
            script.current = None;
        }
    }
}
