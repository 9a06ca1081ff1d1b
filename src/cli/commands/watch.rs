//! Watch command - report settled changes and optionally run a command.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::watcher::{MultiWatchConfig, watch_multiple};

/// Environment variable carrying the changed file to `--exec` commands.
pub const CHANGED_PATH_ENV: &str = "RELOADER_CHANGED_PATH";

/// Make every target absolute and make sure it exists.
pub fn resolve_targets(files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(files.len());
    for file in files {
        let absolute = std::path::absolute(file)
            .with_context(|| format!("invalid path {}", file.display()))?;
        if !absolute.exists() {
            bail!("file not found: {}", absolute.display());
        }
        if !resolved.contains(&absolute) {
            resolved.push(absolute);
        }
    }
    Ok(resolved)
}

pub async fn run_watch(
    files: &[PathBuf],
    exec: &[String],
    settings: &Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let targets = resolve_targets(files)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();
    let config = MultiWatchConfig::new(targets.iter().cloned())
        .debounce(settings.watch.debounce())
        .retry_delay(settings.watch.retry_delay())
        .on_change(move |path| {
            let _ = tx.send(path.to_path_buf());
        })
        .on_error(|e| eprintln!("Watcher error: {e}"));

    let exec = exec.to_vec();
    let consumer = tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            println!("changed: {}", path.display());
            if !exec.is_empty() {
                run_exec(&exec, &path).await;
            }
        }
    });

    eprintln!("Watching {} file(s). Press Ctrl+C to stop", targets.len());
    watch_multiple(config, cancel).await?;

    // The change sender lives in the config, so the consumer drains and exits.
    consumer.await.context("change consumer panicked")?;
    Ok(())
}

async fn run_exec(command: &[String], changed: &Path) {
    let Some((program, args)) = command.split_first() else {
        return;
    };

    let status = Command::new(program)
        .args(args)
        .env(CHANGED_PATH_ENV, changed)
        .status()
        .await;

    match status {
        Ok(status) if status.success() => {
            crate::debug_event!("exec", "finished", "{program}");
        }
        Ok(status) => eprintln!("Command '{program}' exited with {status}"),
        Err(e) => eprintln!("Failed to run '{program}': {e}"),
    }
}
