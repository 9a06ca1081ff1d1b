//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod init;
pub mod monitor;
pub mod run;
pub mod watch;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::cli::Commands;
use crate::config::Settings;

/// Token cancelled on the first Ctrl+C or SIGTERM.
pub fn shutdown_token() -> CancellationToken {
    cancel_on(shutdown_signal())
}

/// Cancel the returned token once `signal` yields a signal name.
///
/// `None` means no handler could be installed; the token then stays live.
pub fn cancel_on<F>(signal: F) -> CancellationToken
where
    F: Future<Output = Option<&'static str>> + Send + 'static,
{
    let token = CancellationToken::new();
    let ct = token.clone();
    tokio::spawn(async move {
        match signal.await {
            Some(name) => {
                eprintln!("Received {name} signal, shutting down");
                ct.cancel();
            }
            None => tracing::warn!("[cli] no shutdown signal handler installed"),
        }
    });
    token
}

async fn shutdown_signal() -> Option<&'static str> {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("interrupt"),
            Err(e) => {
                tracing::warn!("[cli] failed to listen for ctrl+c: {e}");
                None
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => stream.recv().await.map(|()| "terminate"),
            Err(e) => {
                tracing::warn!("[cli] failed to listen for SIGTERM: {e}");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::ready(None::<&'static str>);

    tokio::select! {
        Some(name) = interrupt => Some(name),
        Some(name) = terminate => Some(name),
        else => None,
    }
}

/// Run a parsed command with the effective settings.
pub async fn dispatch(command: Commands, settings: Settings) -> anyhow::Result<()> {
    match command {
        Commands::Watch { files, exec } => {
            watch::run_watch(&files, &exec, &settings, shutdown_token()).await
        }
        Commands::Run { binary, args } => {
            run::run_supervised(&binary, args, &settings, shutdown_token()).await
        }
        Commands::SelfMonitor => monitor::run_self_monitor(&settings, shutdown_token()).await,
        Commands::Config => {
            init::run_config(&settings);
            Ok(())
        }
        Commands::Init { force } => init::run_init(crate::config::CONFIG_FILE_NAME, force),
    }
}
