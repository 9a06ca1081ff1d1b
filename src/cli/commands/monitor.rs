//! Self command - watch the reloader executable.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::watcher::{SelfMonitorConfig, self_monitor};

pub async fn run_self_monitor(
    settings: &Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let config = SelfMonitorConfig::new()
        .debounce(settings.watch.debounce())
        .retry_delay(settings.watch.retry_delay())
        .on_reload(|| println!("Executable replaced; restart to pick up the new build"))
        .on_error(|e| eprintln!("Watcher error: {e}"));

    eprintln!("Monitoring own executable. Press Ctrl+C to stop");
    self_monitor(config, cancel).await?;
    Ok(())
}
