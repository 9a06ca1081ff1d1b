use std::process::Command;
use tempfile::TempDir;

fn reloader(dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_reloader"));
    command.current_dir(dir).env_remove("RUST_LOG");
    command
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let output = reloader(temp_path)
        .arg("init")
        .output()
        .expect("Failed to run init command");

    assert!(output.status.success());

    let config_path = temp_path.join(".reloader.toml");
    assert!(config_path.exists());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[watch]"));
    assert!(content.contains("debounce_ms = 3000"));

    // Second init without --force refuses to overwrite
    let output = reloader(temp_path).arg("init").output().unwrap();
    assert!(!output.status.success());

    let output = reloader(temp_path).args(["init", "--force"]).output().unwrap();
    assert!(output.status.success());
}

#[test]
fn test_config_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let config_content = r#"
version = 2
[watch]
retry_delay_ms = 99
"#;
    std::fs::write(temp_path.join(".reloader.toml"), config_content).unwrap();

    let output = reloader(temp_path)
        .args(["--debounce-ms", "40", "config"])
        .output()
        .expect("Failed to run config command");

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Current Configuration:"));
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("retry_delay_ms = 99"));
    assert!(stdout.contains("debounce_ms = 40"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = reloader(temp_dir.path())
        .args(["--config", "nope.toml", "config"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("config file not found"));
}

#[test]
fn test_watch_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = reloader(temp_dir.path())
        .args(["watch", "does-not-exist.toml"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("file not found"));
}

#[cfg(unix)]
#[test]
fn test_watch_stops_cleanly_on_sigterm() {
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("app.toml");
    std::fs::write(&target, "").unwrap();

    let mut child = reloader(temp_dir.path())
        .args(["watch", "app.toml"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start watch command");

    // Let the runtime install its signal handlers
    std::thread::sleep(Duration::from_millis(500));

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("watch did not exit after SIGTERM");
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    // Exit code 0 means the watcher was cancelled, not killed by the signal
    assert!(status.success(), "unexpected exit status: {status}");
    let mut stderr = String::new();
    std::io::Read::read_to_string(child.stderr.as_mut().unwrap(), &mut stderr).unwrap();
    assert!(stderr.contains("Received terminate signal"));
}
