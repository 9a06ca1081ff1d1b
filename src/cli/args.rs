//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::Settings;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Debounced file watcher for self-reloading programs
#[derive(Parser, Debug)]
#[command(
    name = "reloader",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run a callback when files settle after a change",
    long_about = "Watch files, collapse bursts of writes into one notification, and \
                  restart or notify programs when they change.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom .reloader.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet period in milliseconds before a change is reported (overrides config)
    #[arg(long, global = true, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Wait in milliseconds before recreating a failed watcher (overrides config)
    #[arg(long, global = true, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(ms) = self.debounce_ms {
            settings.watch.debounce_ms = ms;
        }
        if let Some(ms) = self.retry_delay_ms {
            settings.watch.retry_delay_ms = ms;
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch files and report each settled change
    #[command(
        after_help = "Examples:\n  reloader watch ./app ./config.yaml\n  reloader watch config.toml --exec make reload"
    )]
    Watch {
        /// Files to watch (must exist)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Command to run after each settled change; receives RELOADER_CHANGED_PATH
        #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
        exec: Vec<String>,
    },

    /// Run a program and restart it whenever its binary changes
    #[command(after_help = "Examples:\n  reloader run ./target/debug/server -- --port 8080")]
    Run {
        /// Program to supervise
        binary: PathBuf,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },

    /// Watch the reloader executable itself and report when it is replaced
    #[command(name = "self")]
    SelfMonitor,

    /// Show current configuration settings
    Config,

    /// Create a default .reloader.toml in the current directory
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_with_exec() {
        let cli = Cli::parse_from([
            "reloader",
            "watch",
            "a.toml",
            "b.toml",
            "--exec",
            "make",
            "-C",
            "build",
        ]);

        match cli.command {
            Commands::Watch { files, exec } => {
                assert_eq!(files, vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
                assert_eq!(exec, vec!["make", "-C", "build"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_watch_requires_files() {
        assert!(Cli::try_parse_from(["reloader", "watch"]).is_err());
    }

    #[test]
    fn test_run_passes_trailing_args() {
        let cli = Cli::parse_from(["reloader", "run", "./server", "--", "--port", "8080"]);

        match cli.command {
            Commands::Run { binary, args } => {
                assert_eq!(binary, PathBuf::from("./server"));
                assert_eq!(args, vec![OsString::from("--port"), OsString::from("8080")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["reloader", "--debounce-ms", "250", "self"]);
        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.watch.debounce_ms, 250);
        assert_eq!(settings.watch.retry_delay_ms, 2000);
        assert!(matches!(cli.command, Commands::SelfMonitor));
    }
}
