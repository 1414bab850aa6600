//! End-to-end tests for `kbforge plate` command.

mod fixtures;
use fixtures::*;

use kbforge::models::{Controller, Stabilizer};

#[test]
fn test_plate_one_opening_per_key() {
    let keyboard = test_keyboard(2, 3, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["plate", "-k", arg(&path), "--json"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let result = stdout_json(&output);
    assert_eq!(result["openings"], 6);
    assert_eq!(result["holes"].as_array().unwrap().len(), 6);
}

#[test]
fn test_plate_mounting_holes() {
    let keyboard = test_keyboard(2, 2, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let with_holes = run_kbforge(
        temp_dir.path(),
        &["plate", "-k", arg(&path), "--mounting-holes", "--json"],
    );
    assert_eq!(with_holes.status.code(), Some(0));
    assert_eq!(stdout_json(&with_holes)["openings"], 5);

    let holes_only = run_kbforge(
        temp_dir.path(),
        &["plate", "-k", arg(&path), "--mounting-holes", "--no-cutouts", "--json"],
    );
    assert_eq!(holes_only.status.code(), Some(0));
    assert_eq!(stdout_json(&holes_only)["openings"], 1);
}

#[test]
fn test_plate_openings_reduce_area() {
    let keyboard = test_keyboard(1, 2, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let area = |extra: &[&str]| {
        let mut args = vec!["plate", "-k", arg(&path), "--json"];
        args.extend_from_slice(extra);
        let output = run_kbforge(temp_dir.path(), &args);
        assert_eq!(output.status.code(), Some(0));
        stdout_json(&output)["area"].as_f64().unwrap()
    };

    let blank = area(&["--no-cutouts"]);
    let cut = area(&[]);
    // Two 14 mm openings, slightly grown by the padding.
    let removed = blank - cut;
    assert!(removed > 2.0 * 14.0 * 14.0 * 0.98, "removed {removed}");
    assert!(removed < 2.0 * 14.2 * 14.2, "removed {removed}");
}

#[test]
fn test_plate_stabilizer_merges_into_opening() {
    let mut keyboard = test_keyboard(1, 1, Controller::ProMicro);
    keyboard.keys[0].unit_width = 2.0;
    keyboard.keys[0].stabilizer = Some(Stabilizer { size: 2.0, r: 0.0 });
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["plate", "-k", arg(&path), "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    assert_eq!(result["openings"], 1, "switch and housings form one opening");
    let xs: Vec<f64> = result["holes"][0]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p[0].as_f64().unwrap())
        .collect();
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(max_x > 11.9 + 4.0, "housing reaches past the wire offset: {max_x}");
}

#[test]
fn test_plate_writes_output_file() {
    let keyboard = test_keyboard(1, 2, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");
    let plate_path = temp_dir.path().join("plate.json");

    let output = run_kbforge(
        temp_dir.path(),
        &["plate", "-k", arg(&path), "-o", arg(&plate_path)],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Plate generated"));
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plate_path).unwrap()).unwrap();
    assert_eq!(written["openings"], 2);
}
