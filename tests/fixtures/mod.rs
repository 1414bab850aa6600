//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use kbforge::models::{Controller, Key, Keyboard, Position};
use kbforge::parser::save_keyboard;
use kbforge::services::{fill_matrix_rows, Grid};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Key pitch used by every fixture.
pub const PITCH: f64 = 19.05;

/// Path to the kbforge binary
pub fn kbforge_bin() -> &'static str {
    env!("CARGO_BIN_EXE_kbforge")
}

/// Keys of a plain `rows` × `cols` grid, top row first.
pub fn grid_keys(rows: i32, cols: i32) -> Vec<Key> {
    let grid = Grid::new(PITCH);
    (0..rows).flat_map(|row| grid.row(0..cols, -row)).collect()
}

/// Creates a grid keyboard with a row-based matrix.
///
/// # Arguments
/// * `rows` - Number of physical rows
/// * `cols` - Keys per row
/// * `controller` - Controller whose IO lines the matrix uses
pub fn test_keyboard(rows: i32, cols: i32, controller: Controller) -> Keyboard {
    let mut keys = grid_keys(rows, cols);
    fill_matrix_rows(&mut keys, controller.io_lines()).expect("grid fits the controller");
    let mut keyboard = Keyboard::new("test-board", controller).with_keys(keys);
    keyboard.hole_positions = vec![Position::new(PITCH / 2.0, -PITCH / 2.0)];
    keyboard.info_text = "kbforge test".to_string();
    keyboard
}

/// Creates a grid keyboard without matrix pins.
pub fn test_keyboard_unwired(rows: i32, cols: i32) -> Keyboard {
    Keyboard::new("unwired", Controller::ProMicro).with_keys(grid_keys(rows, cols))
}

/// Creates a keyboard with two keys on the same matrix position.
pub fn test_keyboard_with_duplicate_pins() -> Keyboard {
    let mut keyboard = test_keyboard(1, 3, Controller::ProMicro);
    keyboard.keys[2].pin_low = keyboard.keys[1].pin_low;
    keyboard.keys[2].pin_high = keyboard.keys[1].pin_high;
    keyboard
}

/// Writes `keyboard` to `file_name` inside a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn create_temp_keyboard_file(keyboard: &Keyboard, file_name: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(file_name);
    save_keyboard(&path, keyboard).expect("Failed to write keyboard file");
    (path, temp_dir)
}

/// Config path inside `dir`; the file does not exist, so defaults apply.
pub fn isolated_config(dir: &Path) -> PathBuf {
    dir.join("config.toml")
}

/// Runs kbforge with an isolated configuration.
pub fn run_kbforge(config_dir: &Path, args: &[&str]) -> Output {
    let config = isolated_config(config_dir);
    Command::new(kbforge_bin())
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Parses stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {stdout}\nstderr: {}",
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

/// Path as &str for command arguments.
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}
