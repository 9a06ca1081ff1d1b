//! Init and Config commands.

use std::path::Path;

use anyhow::anyhow;

use crate::config::Settings;

/// Run init command - create configuration file.
pub fn run_init(path: impl AsRef<Path>, force: bool) -> anyhow::Result<()> {
    let config_path = path.as_ref();

    if config_path.exists() && !force {
        eprintln!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        eprintln!("Use --force to overwrite");
        return Err(anyhow!("refusing to overwrite {}", config_path.display()));
    }

    let created = Settings::init_config_file(config_path, force).map_err(|e| anyhow!("{e}"))?;
    println!("Created configuration file at: {}", created.display());
    println!("Edit this file to customize your settings.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match toml::to_string_pretty(config) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => eprintln!("Error displaying config: {e}"),
    }
}
