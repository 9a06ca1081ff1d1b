//! Run command - supervise a program and restart it when its binary changes.

use std::ffi::OsString;
use std::path::Path;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::commands::watch::resolve_targets;
use crate::config::Settings;
use crate::supervisor::Supervisor;
use crate::watcher::{WatchConfig, watch};

pub async fn run_supervised(
    binary: &Path,
    args: Vec<OsString>,
    settings: &Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let program = resolve_targets(&[binary.to_path_buf()])?
        .pop()
        .context("no program to run")?;

    let mut supervisor = Supervisor::new(program.clone(), args);
    supervisor
        .start()
        .with_context(|| format!("failed to start {}", program.display()))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let changed = program.clone();
    let config = WatchConfig::new(program)
        .debounce(settings.watch.debounce())
        .retry_delay(settings.watch.retry_delay())
        .on_change(move || {
            let _ = tx.send(changed.clone());
        })
        .on_error(|e| eprintln!("Watcher error: {e}"));

    let supervision = tokio::spawn(supervisor.run(rx, cancel.clone()));

    let watched = watch(config, cancel.clone()).await;
    cancel.cancel();

    supervision
        .await
        .context("supervisor task panicked")?
        .context("failed to stop supervised program")?;
    watched?;
    Ok(())
}
