use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

#[test]
fn bundled_scenario_prints_a_summary() {
    let output = run(&["--ticks", "120", "--seed", "3", "--summary-only"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("ticks: 120"), "{stdout}");
    assert!(stdout.contains("player survived"), "{stdout}");
}

#[test]
fn invalid_scenario_is_reported() {
    let path = scenario_file("empty-platforms", "[player]\nx = 10.0\ny = 10.0\n");

    let output = run_scenario(&path);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid scenario"), "{stderr}");
    assert!(stderr.contains("scenario declares no platforms"), "{stderr}");
}

#[test]
fn degenerate_platform_is_named_by_index() {
    let path = scenario_file(
        "flat-platform",
        "[player]\nx = 10.0\ny = 10.0\n\n\
         [[platforms]]\nx = 0.0\ny = 700.0\nwidth = 1200.0\nheight = 100.0\n\n\
         [[platforms]]\nx = 0.0\ny = 400.0\nwidth = 200.0\nheight = 0.0\n",
    );

    let output = run_scenario(&path);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("platform 1 must have a positive size"), "{stderr}");
}

#[test]
fn unknown_scenario_keys_fail_to_load() {
    let path = scenario_file("unknown-key", "gravity = 2.0\n\n[player]\nx = 1.0\ny = 1.0\n");

    let output = run_scenario(&path);
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load scenario"), "{stderr}");
}

#[test]
fn missing_scenario_file_is_reported() {
    let path = std::env::temp_dir().join("elemental-arena-does-not-exist.toml");

    let output = run_scenario(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"), "{stderr}");
}

#[test]
fn non_numeric_seed_is_rejected_by_the_parser() {
    let output = run(&["--seed", "seven"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--seed"), "{stderr}");
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elemental-arena"))
        .args(args)
        .output()
        .expect("failed to run elemental-arena")
}

fn run_scenario(path: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elemental-arena"))
        .arg("--scenario")
        .arg(path)
        .args(["--ticks", "1", "--summary-only"])
        .output()
        .expect("failed to run elemental-arena")
}

fn scenario_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "elemental-arena-{name}-{}.toml",
        std::process::id()
    ));
    fs::write(&path, contents).expect("write scenario");
    path
}
