use reloader::Settings;
use std::env;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_env_override_with_custom_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".reloader.toml");
    std::fs::write(
        &config_path,
        r#"
[watch]
debounce_ms = 500
retry_delay_ms = 750

[logging]
default = "info"
"#,
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("RELOADER_WATCH__DEBOUNCE_MS", "125");
        env::set_var("RELOADER_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("RELOADER_WATCH__DEBOUNCE_MS");
        env::remove_var("RELOADER_LOGGING__DEFAULT");
    }

    // Env wins over the file, the file wins over defaults
    assert_eq!(settings.watch.debounce(), Duration::from_millis(125));
    assert_eq!(settings.watch.retry_delay(), Duration::from_millis(750));
    assert_eq!(settings.logging.default, "debug");
}
