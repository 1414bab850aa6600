//! End-to-end tests for `kbforge qmk` command.

mod fixtures;
use fixtures::*;

use kbforge::firmware::QmkInfoJson;
use kbforge::models::Controller;

#[test]
fn test_qmk_info_to_stdout() {
    let keyboard = test_keyboard(2, 3, Controller::ProMicro);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.yaml");

    let output = run_kbforge(temp_dir.path(), &["qmk", "-k", arg(&path)]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let info = stdout_json(&output);
    assert_eq!(info["keyboard_name"], "test-board");
    assert_eq!(info["processor"], "atmega32u4");
    assert_eq!(info["bootloader"], "caterina");
    assert_eq!(info["diode_direction"], "COL2ROW");
    assert_eq!(info["usb"]["pid"], "0x23B0");
    assert_eq!(info["width"], 3);
    assert_eq!(info["height"], 2);
    assert_eq!(info["matrix_pins"]["rows"], serde_json::json!(["D3", "D2"]));
    assert_eq!(info["matrix_pins"]["cols"], serde_json::json!(["D1", "D0", "D4"]));
    assert_eq!(info["features"]["mousekey"], false);

    let layout = info["layouts"]["LAYOUT"]["layout"].as_array().unwrap();
    assert_eq!(layout.len(), 6);
    // First key of the second row: one unit down from the top-left key.
    assert_eq!(layout[3]["matrix"], serde_json::json!([1, 0]));
    assert!((layout[3]["x"].as_f64().unwrap()).abs() < 1e-9);
    assert!((layout[3]["y"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert!(layout[3].get("w").is_none(), "1u width is omitted");
}

#[test]
fn test_qmk_info_to_file() {
    let keyboard = test_keyboard(1, 2, Controller::Stm32f072);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");
    let info_path = temp_dir.path().join("info.json");

    let output = run_kbforge(
        temp_dir.path(),
        &["qmk", "-k", arg(&path), "-o", arg(&info_path)],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty(), "info.json goes to the file only");
    assert!(String::from_utf8_lossy(&output.stderr).contains("✓ Wrote"));

    let info: QmkInfoJson =
        serde_json::from_str(&std::fs::read_to_string(&info_path).unwrap()).unwrap();
    assert_eq!(info.processor, "STM32F072");
    assert_eq!(info.bootloader, "stm32-dfu");
    assert_eq!(info.key_count, 2);
    assert_eq!(info.matrix_pins.rows, vec!["C13"]);
    assert_eq!(info.matrix_pins.cols, vec!["C14", "C15"]);
}

#[test]
fn test_qmk_community_layout_and_sequence() {
    let mut keyboard = test_keyboard(1, 3, Controller::ProMicro);
    keyboard.qmk.layout = Some("ortho_1x3".to_string());
    keyboard.qmk.layout_sequence = vec![2, 1, 0];
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["qmk", "-k", arg(&path)]);

    assert_eq!(output.status.code(), Some(0));
    let info = stdout_json(&output);
    assert_eq!(info["community_layouts"], serde_json::json!(["ortho_1x3"]));
    let layout = info["layouts"]["LAYOUT_ortho_1x3"]["layout"].as_array().unwrap();
    assert_eq!(layout[0]["matrix"], serde_json::json!([0, 2]));
    assert!((layout[0]["x"].as_f64().unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn test_qmk_rejects_unwired_keyboard() {
    let keyboard = test_keyboard_unwired(1, 2);
    let (path, temp_dir) = create_temp_keyboard_file(&keyboard, "board.json");

    let output = run_kbforge(temp_dir.path(), &["qmk", "-k", arg(&path)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unassigned Key"));
}
