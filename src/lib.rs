//! Debounced file change notifications for self-reloading programs.
//!
//! ```no_run
//! use reloader::{WatchConfig, watch};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), reloader::WatchError> {
//! let cancel = CancellationToken::new();
//! let config = WatchConfig::new("/usr/local/bin/myapp")
//!     .debounce(Duration::from_secs(1))
//!     .on_change(|| println!("binary replaced"));
//! watch(config, cancel).await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod supervisor;
pub mod watcher;

pub use config::Settings;
pub use watcher::{
    ChangeOps, EventSession, EventSource, MultiWatchConfig, NotifySource, RawEvent,
    SelfMonitorConfig, WatchConfig, WatchError, self_monitor, watch, watch_multiple,
    watch_multiple_with, watch_with,
};
