use assert_cmd::Command;
use tempfile::tempdir;

fn new0(home: &std::path::Path) -> Command {
    let mut command = Command::cargo_bin("new0").unwrap();
    command
        .env_remove("PYTHON0_LIB")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    command
}

#[test]
fn missing_library_is_fatal() {
    let temp = tempdir().unwrap();
    let output = new0(temp.path()).args(["-c", "1 + 1"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("new0 error"));
    assert!(stderr.contains("PYTHON0_LIB"));
}

#[test]
fn unloadable_library_is_fatal() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("libpython0.so");
    let output = new0(temp.path())
        .arg("--lib")
        .arg(&missing)
        .args(["-c", "1 + 1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load interpreter library"));
}

#[cfg(target_os = "linux")]
#[test]
fn library_without_entry_points_fails_on_first_use() {
    let temp = tempdir().unwrap();
    let output = new0(temp.path())
        .env("PYTHON0_LIB", "libc.so.6")
        .args(["-c", "1 + 1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("symbol `parse_string` not found"));
}
