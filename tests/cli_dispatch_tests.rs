use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_cdr-heatmap")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("cdr-heatmap-cli-{name}-{stamp}.json"))
}

fn run(args: &[&str], presets: &PathBuf) -> Output {
    Command::new(bin())
        .args(args)
        .env("CDR_HEATMAP_PRESETS", presets)
        .env("CDR_HEATMAP_CONFIG", unique_temp_path("no-config"))
        .output()
        .expect("command should run")
}

#[test]
fn missing_command_prints_usage() {
    let output = run(&[], &unique_temp_path("usage"));
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: cdr-heatmap"));
}

#[test]
fn grid_command_emits_json() {
    let output = run(&["grid", "10", "1", "5", "20", "--storm"], &unique_temp_path("grid"));
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("grid should emit json");
    assert_eq!(payload["max_cdr"], 21);
    assert_eq!(payload["columns"], 30);
    assert_eq!(payload["values"].as_array().map(Vec::len), Some(21 * 30));
}

#[test]
fn grid_command_table_has_one_line_per_row() {
    let output = run(&["grid", "10", "1", "5", "10", "--table"], &unique_temp_path("table"));
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[1].starts_with("10%\t"));
    assert!(lines[11].starts_with("0%\t"));
}

#[test]
fn grid_command_rejects_out_of_band_cdr() {
    let output = run(&["grid", "10", "1", "5", "150"], &unique_temp_path("bad-cdr"));
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("between 10 and 100"));
}

#[test]
fn save_preset_rejects_duplicate_names() {
    let presets = unique_temp_path("save");
    let args = ["save-preset", "Katana", "30", "2", "6", "50"];

    let first = run(&args, &presets);
    assert_eq!(first.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&first.stdout).contains("saved preset 1 'Katana'"));

    let second = run(&args, &presets);
    assert_eq!(second.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));

    let listed = run(&["presets"], &presets);
    assert_eq!(listed.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&listed.stdout)).expect("presets json");
    assert_eq!(payload.as_array().map(Vec::len), Some(1));

    let _ = fs::remove_file(presets);
}

#[test]
fn compare_and_rank_use_stored_presets() {
    let presets = unique_temp_path("compare");
    for args in [
        ["save-preset", "Fast", "10", "1", "2", "40"],
        ["save-preset", "Slow", "10", "1", "10", "40"],
    ] {
        assert_eq!(run(&args, &presets).status.code(), Some(0));
    }

    let compared = run(&["compare", "Fast", "Slow", "--absolute"], &presets);
    assert_eq!(compared.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&compared.stdout)).expect("compare json");
    assert_eq!(payload["mode"], "absolute");

    let ranked = run(&["rank", "0", "20"], &presets);
    assert_eq!(ranked.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&ranked.stdout)).expect("rank json");
    assert_eq!(payload[0]["name"], "Fast");

    let missing = run(&["compare", "Fast", "Axe"], &presets);
    assert_eq!(missing.status.code(), Some(1));

    let _ = fs::remove_file(presets);
}

#[test]
fn save_preset_rejects_unparseable_caps() {
    let presets = unique_temp_path("bad-caps");

    let output = run(&["save-preset", "Axe", "10", "1", "5", "50", "abc", "oops"], &presets);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("save failed: low_cap must be a number"));
    assert!(!presets.exists());

    let output = run(&["save-preset", "Axe", "10", "1", "5", "50", "20", "oops"], &presets);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("high_cap must be a number"));

    let saved = run(&["save-preset", "Axe", "10", "1", "5", "50", "20", "80"], &presets);
    assert_eq!(saved.status.code(), Some(0));
    let listed = run(&["presets"], &presets);
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&listed.stdout)).expect("presets json");
    assert_eq!(payload[0]["low_cap"].as_f64(), Some(20.0));
    assert_eq!(payload[0]["high_cap"].as_f64(), Some(80.0));

    let _ = fs::remove_file(presets);
}
