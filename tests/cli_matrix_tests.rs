//! End-to-end tests for `kbforge matrix` command.

mod fixtures;
use fixtures::*;

use std::collections::HashSet;

use kbforge::models::Controller;
use kbforge::parser::load_keyboard;

fn pins(result: &serde_json::Value) -> Vec<(u64, u64)> {
    result["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| (k["low"].as_u64().unwrap(), k["high"].as_u64().unwrap()))
        .collect()
}

#[test]
fn test_matrix_rows_strategy() {
    let keyboard = test_keyboard_unwired(2, 3);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["matrix", "-k", arg(&path), "--json"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let result = stdout_json(&output);
    assert_eq!(result["controller"], "pro-micro");
    assert_eq!(result["io_lines"], 18);
    assert_eq!(result["used_lines"], 5);
    assert_eq!(
        pins(&result),
        vec![(0, 2), (0, 3), (0, 4), (1, 2), (1, 3), (1, 4)]
    );
}

#[test]
fn test_matrix_product_strategy_is_unique() {
    let keyboard = test_keyboard_unwired(3, 4);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(
        temp_dir.path(),
        &["matrix", "-k", arg(&path), "--strategy", "product", "--json"],
    );

    assert_eq!(output.status.code(), Some(0));
    let assigned = pins(&stdout_json(&output));
    let unique: HashSet<_> = assigned.iter().collect();
    assert_eq!(unique.len(), 12);
    // Low lines come from the first half of the IO lines, high from the second.
    assert!(assigned.iter().all(|&(low, high)| low < 9 && (9..18).contains(&high)));
}

#[test]
fn test_matrix_random_strategy_is_seeded() {
    let keyboard = test_keyboard_unwired(2, 4);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let run = |seed: &str| {
        let output = run_kbforge(
            temp_dir.path(),
            &["matrix", "-k", arg(&path), "--strategy", "random", "--seed", seed, "--json"],
        );
        assert_eq!(output.status.code(), Some(0));
        pins(&stdout_json(&output))
    };

    let first = run("7");
    assert_eq!(first, run("7"), "same seed, same assignment");
    let unique: HashSet<_> = first.iter().collect();
    assert_eq!(unique.len(), 8);
}

#[test]
fn test_matrix_save_then_validate() {
    let keyboard = test_keyboard_unwired(2, 2);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.yaml");

    let output = run_kbforge(temp_dir.path(), &["matrix", "-k", arg(&path), "--save"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Matrix assigned: 4 keys on 4 of 18 IO lines"), "got: {stdout}");
    assert!(stdout.contains("D3"), "pin names are listed: {stdout}");

    let saved = load_keyboard(&path).unwrap();
    assert!(saved.keys.iter().all(|k| k.pins().is_some()));

    let validate = run_kbforge(temp_dir.path(), &["validate", "-k", arg(&path)]);
    assert_eq!(validate.status.code(), Some(0));
}

#[test]
fn test_matrix_capacity_exceeded() {
    // 1 row of 20 keys needs 21 lines; the Pro Micro has 18.
    let keyboard = test_keyboard_unwired(1, 20);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["matrix", "-k", arg(&path)]);

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_matrix_uses_controller_lines() {
    let mut keyboard = test_keyboard_unwired(1, 2);
    keyboard.controller = Controller::Stm32f072;
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["matrix", "-k", arg(&path), "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    assert_eq!(result["controller"], "stm32f072");
    assert_eq!(result["io_lines"], 32);
}
