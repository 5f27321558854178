use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn japa_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_japa").expect("japa test binary not built")
}

#[test]
fn japa_help_mentions_name() {
    let output = Command::new(japa_bin())
        .arg("--help")
        .output()
        .expect("run japa --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("japa"));
    assert!(combined.contains("--list-input-devices"));
}

#[test]
fn japa_list_input_devices_prints_message() {
    let output = Command::new(japa_bin())
        .arg("--list-input-devices")
        .output()
        .expect("run japa --list-input-devices");
    assert!(output.status.success());
    assert!(!combined_output(&output).trim().is_empty());
}

#[test]
fn japa_rejects_out_of_range_frame_ms() {
    let output = Command::new(japa_bin())
        .args(["--frame-ms", "2", "--list-input-devices"])
        .output()
        .expect("run japa with bad frame size");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--frame-ms"));
}

#[test]
fn japa_rejects_min_decibels_above_ceiling() {
    let output = Command::new(japa_bin())
        .args(["--min-decibels", "-5", "--list-input-devices"])
        .output()
        .expect("run japa with bad decibel floor");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--min-decibels"));
}
