//! Child process supervision for `reloader run`.
//!
//! Restarts are requested over a channel fed by the watcher's change callback,
//! so the kill/wait/spawn cycle runs on its own task instead of inside the
//! session loop.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Keeps one instance of a program running and restarts it on demand.
#[derive(Debug)]
pub struct Supervisor {
    program: PathBuf,
    args: Vec<OsString>,
    child: Option<Child>,
}

impl Supervisor {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = OsString>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
            child: None,
        }
    }

    /// PID of the running child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Spawn the program with inherited stdio. Returns the new PID.
    pub fn start(&mut self) -> io::Result<u32> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .spawn()?;
        let pid = child.id().unwrap_or_default();
        self.child = Some(child);
        crate::log_event!("supervisor", "started", "{} (pid {pid})", self.program.display());
        Ok(pid)
    }

    /// Kill the running child and wait for it to exit.
    pub async fn stop(&mut self) -> io::Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        match child.try_wait()? {
            Some(status) => {
                crate::debug_event!("supervisor", "already exited", "{status}");
            }
            None => {
                child.kill().await?;
                crate::log_event!("supervisor", "stopped", "{}", self.program.display());
            }
        }
        Ok(())
    }

    /// Stop the current child (if any) and start a fresh one.
    pub async fn restart(&mut self) -> io::Result<u32> {
        if let Err(e) = self.stop().await {
            tracing::warn!("[supervisor] failed to stop {}: {e}", self.program.display());
        }
        self.start()
    }

    /// Restart on every message until `cancel` fires, then stop the child.
    pub async fn run(
        mut self,
        mut restarts: mpsc::UnboundedReceiver<PathBuf>,
        cancel: CancellationToken,
    ) -> io::Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = restarts.recv() => match changed {
                    Some(path) => {
                        crate::log_event!("supervisor", "change", "{}", path.display());
                        if let Err(e) = self.restart().await {
                            tracing::error!(
                                "[supervisor] failed to start {}: {e}",
                                self.program.display()
                            );
                        }
                    }
                    None => break,
                },
            }
        }

        self.stop().await
    }
}
