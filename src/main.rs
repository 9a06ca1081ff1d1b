use clap::Parser;
use reloader::Settings;
use reloader::cli::{Cli, commands};
use reloader::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) if !path.is_file() => {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });
    cli.apply_overrides(&mut config);

    logging::init_with_config(&config.logging);

    commands::dispatch(cli.command, config).await
}
