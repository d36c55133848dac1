use mapsense::countdown::{plan, Objective};
use mapsense::settings::{self, Settings};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tempfile::TempDir;

fn mapsense(settings: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mapsense"))
        .arg("--settings")
        .arg(settings)
        .args(["--backend", "console"])
        .args(args)
        .output()
        .expect("failed to run binary")
}

fn session(settings: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mapsense"))
        .arg("--settings")
        .arg(settings)
        .args(["--backend", "console", "run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for binary")
}

fn settings_file() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("settings.toml");
    (dir, path)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// --- Countdown plans ---

#[test]
fn dragon_plan_matches_spawn_offsets() {
    let offsets: Vec<u128> = plan(Objective::Dragon, Duration::from_secs(300))
        .iter()
        .map(|p| p.offset.as_millis())
        .collect();
    assert_eq!(offsets, vec![240_000, 270_000, 285_000, 300_000]);
}

#[test]
fn short_baron_plan_only_announces_spawn() {
    let phrases: Vec<String> = plan(Objective::Baron, Duration::from_secs(10))
        .into_iter()
        .map(|p| p.phrase)
        .collect();
    assert_eq!(phrases, vec!["Baron is up"]);
}

// --- Binary smoke tests ---

#[test]
fn say_speaks_through_console_backend() {
    let (_dir, path) = settings_file();
    let output = mapsense(&path, &["say", "MapSense ready"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "say: MapSense ready\n");
}

#[test]
fn say_is_silent_when_muted() {
    let (_dir, path) = settings_file();
    settings::save(
        &path,
        &Settings {
            muted: true,
            ..Settings::default()
        },
    )
    .expect("save settings");

    let output = mapsense(&path, &["say", "hello"]);
    assert!(output.status.success());
    assert!(!stdout(&output).contains("say:"));
}

#[test]
fn countdown_announces_remaining_milestones() {
    let (_dir, path) = settings_file();
    let output = mapsense(&path, &["countdown", "dragon", "--spawn-in", "100ms"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "say: Dragon is up\n");
}

#[test]
fn session_gates_duplicate_events() {
    let (_dir, path) = settings_file();
    let input = concat!(
        r#"{"events":[{"name":"kill"},{"name":"kill"},{"name":"minions"}]}"#,
        "\n",
        r#"{"events":[{"name":"assist"}]}"#,
        "\n",
        "quit\n",
    );

    let output = session(&path, input);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "say: You got a kill\nsay: Assist\n");
}

#[test]
fn session_persists_settings_changes() {
    let (_dir, path) = settings_file();
    let output = session(&path, "rate 1.4\nobjectives off\nmute\nevent kill\n");

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());

    let saved = settings::load(&path).expect("load settings");
    assert!(saved.muted);
    assert!(!saved.speak_objectives);
    assert_eq!(saved.rate, 1.4);
}

#[test]
fn session_skips_bad_lines() {
    let (_dir, path) = settings_file();
    let output = session(&path, "{broken\nherald\nt\n");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "say: MapSense ready\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipping input"));
}

#[test]
fn config_set_then_show() {
    let (_dir, path) = settings_file();
    let output = mapsense(&path, &["config", "set", "--kills", "false", "--rate", "1.3"]);
    assert!(output.status.success());

    let output = mapsense(&path, &["config", "show"]);
    let shown = stdout(&output);
    assert!(shown.contains("speak_kills = false"));
    assert!(shown.contains("rate = 1.3"));

    let rejected = mapsense(&path, &["config", "set", "--rate", "0"]);
    assert!(!rejected.status.success());
}

#[test]
fn doctor_does_not_panic() {
    let (_dir, path) = settings_file();
    let output = mapsense(&path, &["doctor"]);

    // exits 0 or 1 depending on whether spd-say is installed
    assert_ne!(output.status.code(), Some(101), "binary panicked");
}
