//! End-to-end tests for `kbforge config` commands.
//!
//! Every test points `--config` at a file inside its own temporary
//! directory, so the user's real configuration is never read or written.

mod fixtures;
use fixtures::*;

use kbforge::config::Config;
use kbforge::models::Controller;
use tempfile::TempDir;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults_as_toml() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_kbforge(temp_dir.path(), &["config", "show"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[geometry]"), "got: {stdout}");
    assert!(stdout.contains("pitch = 19.05"));
    assert!(stdout.contains("[plate]"));
}

#[test]
fn test_config_show_json_format() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_kbforge(temp_dir.path(), &["config", "show", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    assert_eq!(result["geometry"]["pitch"], 19.05);
    assert_eq!(result["geometry"]["resolution"], 64);
    assert_eq!(result["outline"]["concave"], 1.5);
    assert_eq!(result["matrix"]["seed"], 0);
    assert_eq!(result["plate"]["cutout_size"], 14.0);
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_persists() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_kbforge(
        temp_dir.path(),
        &["config", "set", "--pitch", "18", "--seed", "42"],
    );

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration updated"));

    let saved = Config::load_from(&isolated_config(temp_dir.path())).unwrap();
    assert!((saved.geometry.pitch - 18.0).abs() < f64::EPSILON);
    assert_eq!(saved.matrix.seed, 42);
    // Untouched values keep their defaults.
    assert_eq!(saved.geometry.resolution, 64);

    let show = run_kbforge(temp_dir.path(), &["config", "show", "--json"]);
    assert_eq!(stdout_json(&show)["geometry"]["pitch"], 18.0);
}

#[test]
fn test_config_set_requires_an_option() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_kbforge(temp_dir.path(), &["config", "set"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("At least one"));
    assert!(!isolated_config(temp_dir.path()).exists());
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_kbforge(temp_dir.path(), &["config", "set", "--pitch=-1"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("geometry.pitch"));
    assert!(!isolated_config(temp_dir.path()).exists());
}

#[test]
fn test_invalid_config_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(isolated_config(temp_dir.path()), "[geometry]\npitch = 0.0\n").unwrap();

    let output = run_kbforge(temp_dir.path(), &["config", "show"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load config"));
}

// ============================================================================
// Config drives the generators
// ============================================================================

#[test]
fn test_configured_pitch_changes_qmk_positions() {
    let keyboard = test_keyboard(1, 2, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let set = run_kbforge(temp_dir.path(), &["config", "set", "--pitch", "38.1"]);
    assert_eq!(set.status.code(), Some(0));

    // Keys 19.05 mm apart are half a unit apart at a 38.1 mm pitch.
    let output = run_kbforge(temp_dir.path(), &["qmk", "-k", arg(&path)]);
    assert_eq!(output.status.code(), Some(0));
    let layout = &stdout_json(&output)["layouts"]["LAYOUT"]["layout"];
    assert!((layout[1]["x"].as_f64().unwrap() - 0.5).abs() < 1e-9);
}
