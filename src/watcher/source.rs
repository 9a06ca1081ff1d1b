//! Event source adapter around the native file watcher.
//!
//! The session loop only talks to the [`EventSource`] and [`EventSession`]
//! traits. [`NotifySource`] is the production implementation backed by
//! `notify::RecommendedWatcher`; tests plug in a scripted source instead.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bitflags::bitflags;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;

/// Capacity of the channel between the notify thread and the session loop.
const EVENT_BUFFER: usize = 100;

bitflags! {
    /// Operation kinds carried by a raw event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeOps: u8 {
        const CREATE = 1 << 0;
        const WRITE = 1 << 1;
        const REMOVE = 1 << 2;
        const RENAME = 1 << 3;
        const CHMOD = 1 << 4;
    }
}

impl ChangeOps {
    /// Operations that count as a change of a target file.
    pub const RELEVANT: ChangeOps = ChangeOps::WRITE
        .union(ChangeOps::CREATE)
        .union(ChangeOps::RENAME)
        .union(ChangeOps::REMOVE);

    /// Whether any relevant operation is present.
    pub fn is_relevant(self) -> bool {
        self.intersects(Self::RELEVANT)
    }
}

impl From<&EventKind> for ChangeOps {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeOps::CREATE,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeOps::RENAME,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeOps::CHMOD,
            EventKind::Modify(_) => ChangeOps::WRITE,
            EventKind::Remove(_) => ChangeOps::REMOVE,
            EventKind::Access(_) => ChangeOps::empty(),
            _ => ChangeOps::empty(),
        }
    }
}

impl fmt::Display for ChangeOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// A single raw change notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub ops: ChangeOps,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, ops: ChangeOps) -> Self {
        Self {
            path: path.into(),
            ops,
        }
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.ops, self.path)
    }
}

/// Factory for watch sessions.
pub trait EventSource: Send {
    type Session: EventSession;

    /// Create a fresh session with no directories registered.
    fn open(&mut self) -> Result<Self::Session, WatchError>;
}

/// One live binding to the underlying watch mechanism.
#[async_trait]
pub trait EventSession: Send {
    /// Register a directory (non-recursive).
    fn add_watch(&mut self, dir: &Path) -> Result<(), WatchError>;

    /// Next event or error. `None` once the source has stopped.
    ///
    /// Must be cancel safe: it is raced inside `tokio::select!`.
    async fn recv(&mut self) -> Option<Result<RawEvent, WatchError>>;

    /// Release the handle. Idempotent; never fails.
    fn close(&mut self);
}

/// [`EventSource`] backed by `notify::RecommendedWatcher`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifySource;

impl NotifySource {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for NotifySource {
    type Session = NotifySession;

    fn open(&mut self) -> Result<NotifySession, WatchError> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        // Runs on notify's own thread, so blocking_send is fine here.
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let ops = ChangeOps::from(&event.kind);
                for path in event.paths {
                    if tx.blocking_send(Ok(RawEvent { path, ops })).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = tx.blocking_send(Err(WatchError::EventError {
                    details: e.to_string(),
                }));
            }
        })?;

        Ok(NotifySession {
            watcher: Some(watcher),
            rx,
        })
    }
}

/// Session handed out by [`NotifySource`].
pub struct NotifySession {
    watcher: Option<notify::RecommendedWatcher>,
    rx: mpsc::Receiver<Result<RawEvent, WatchError>>,
}

#[async_trait]
impl EventSession for NotifySession {
    fn add_watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        let watcher = self.watcher.as_mut().ok_or(WatchError::ChannelClosed)?;
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })
    }

    async fn recv(&mut self) -> Option<Result<RawEvent, WatchError>> {
        self.rx.recv().await
    }

    fn close(&mut self) {
        // Close the receiver first so a notify thread parked in blocking_send
        // wakes up before the watcher is dropped.
        self.rx.close();
        if self.watcher.take().is_some() {
            crate::debug_event!("source", "closed");
        }
    }
}

impl Drop for NotifySession {
    fn drop(&mut self) {
        self.close();
    }
}
