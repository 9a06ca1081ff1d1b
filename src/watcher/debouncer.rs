//! Per-target debouncing of change events.
//!
//! Each target has at most one pending timer. Recording an event for a target
//! aborts its previous timer and schedules a new one; a timer that survives the
//! full delay posts the target onto the settlement channel, which the session
//! loop drains. Callbacks therefore never run inside a timer task.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A scheduled settlement for one target.
#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct TimerTable {
    pending: HashMap<PathBuf, PendingTimer>,
    next_generation: u64,
}

/// Debounces change events by target path.
///
/// The timer table is shared with the spawned timer tasks, which remove their
/// own entry when they fire. A timer only settles if its generation is still
/// current under the lock, so a rescheduled timer can never fire stale.
#[derive(Debug)]
pub struct Debouncer {
    table: Arc<Mutex<TimerTable>>,
    settled_tx: mpsc::UnboundedSender<PathBuf>,
    delay: Duration,
}

impl Debouncer {
    /// Create a debouncer and the receiver its settlements are posted to.
    ///
    /// Must be used from within a tokio runtime.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            table: Arc::new(Mutex::new(TimerTable::default())),
            settled_tx,
            delay,
        };
        (debouncer, settled_rx)
    }

    /// Record a change, (re)starting the target's timer.
    pub fn record(&self, target: &Path) {
        let mut table = self.table.lock();
        table.next_generation += 1;
        let generation = table.next_generation;

        let task_table = Arc::clone(&self.table);
        let tx = self.settled_tx.clone();
        let delay = self.delay;
        let path = target.to_path_buf();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut table = task_table.lock();
            let current = table
                .pending
                .get(&path)
                .is_some_and(|timer| timer.generation == generation);
            if current {
                table.pending.remove(&path);
                // Sent under the lock so a concurrent record() orders after us.
                let _ = tx.send(path);
            }
        });

        if let Some(previous) = table
            .pending
            .insert(target.to_path_buf(), PendingTimer { generation, handle })
        {
            previous.handle.abort();
        }
    }

    /// Abort every pending timer.
    pub fn cancel_all(&self) {
        let mut table = self.table.lock();
        for (_, timer) in table.pending.drain() {
            timer.handle.abort();
        }
    }

    /// Whether any target is waiting to settle.
    pub fn has_pending(&self) -> bool {
        !self.table.lock().pending.is_empty()
    }

    /// Number of targets waiting to settle.
    pub fn pending_count(&self) -> usize {
        self.table.lock().pending.len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
