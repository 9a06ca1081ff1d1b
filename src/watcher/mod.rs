//! Debounced file watcher with self-healing sessions.
//!
//! Watches individual files (not trees) and calls back once per burst of
//! changes. Raw events come from a pluggable [`EventSource`]; the production
//! one wraps `notify`.
//!
//! # Architecture
//!
//! ```text
//! watch / watch_multiple / self_monitor
//!   - validate config, group targets by directory (PathRegistry)
//!   - SessionLoop
//!       EventSource::open -> EventSession (one per retry cycle)
//!       TargetFilter     -> exact path + op match
//!       Debouncer        -> one timer per target, settlements over mpsc
//!         |
//!    on_change / on_event / on_error
//! ```

mod debouncer;
mod error;
mod filter;
mod options;
mod path_registry;
mod session;
mod source;
#[cfg(test)]
mod testing;

pub use debouncer::Debouncer;
pub use error::WatchError;
pub use filter::TargetFilter;
pub use options::{
    ChangeFn, DEFAULT_DEBOUNCE, DEFAULT_RETRY_DELAY, ErrorFn, EventFn, MultiWatchConfig,
    PathChangeFn, SelfMonitorConfig, WatchConfig,
};
pub use path_registry::PathRegistry;
pub use session::{self_monitor, watch, watch_multiple, watch_multiple_with, watch_with};
pub use source::{ChangeOps, EventSession, EventSource, NotifySession, NotifySource, RawEvent};
