use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn touchline(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("touchline").unwrap();
    cmd.env("TOUCHLINE_DATA_DIR", data_dir.path())
        .env_remove("TOUCHLINE_LOG");
    cmd
}

#[test]
fn test_team_add_and_list() {
    let data_dir = TempDir::new().unwrap();

    touchline(&data_dir)
        .args(["team", "add", "Under 12 Girls", "--color", "#1e88e5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created team: Under 12 Girls"));

    touchline(&data_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Under 12 Girls"))
        .stdout(predicate::str::contains("1 team(s)"));
}

#[test]
fn test_duplicate_team_name_fails() {
    let data_dir = TempDir::new().unwrap();

    touchline(&data_dir).args(["team", "add", "Alpha"]).assert().success();

    touchline(&data_dir)
        .args(["team", "add", "ALPHA "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name already in use"));
}

#[test]
fn test_personnel_add_and_remove() {
    let data_dir = TempDir::new().unwrap();

    touchline(&data_dir)
        .args(["personnel", "add", "Jordan", "--role", "head-coach"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Head coach: Jordan"));

    touchline(&data_dir)
        .args(["personnel", "remove", "jordan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed Jordan"));

    touchline(&data_dir)
        .args(["personnel", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No personnel found."));
}

#[test]
fn test_export_then_import() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let export_file = source.path().join("export.json");

    touchline(&source).args(["team", "add", "Alpha"]).assert().success();
    touchline(&source)
        .args(["export"])
        .arg(&export_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    touchline(&target)
        .args(["import", "--check"])
        .arg(&export_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Format version: 1"));

    touchline(&target)
        .args(["import"])
        .arg(&export_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 skipped"));

    touchline(&target)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha"));
}

#[test]
fn test_legacy_data_migrated_on_first_run() {
    let data_dir = TempDir::new().unwrap();
    let legacy = serde_json::json!({
        "soccerTeamsIndex": serde_json::json!({
            "team_1": {"id": "team_1", "name": "Legacy FC"}
        })
        .to_string()
    });
    std::fs::write(data_dir.path().join("legacy.json"), legacy.to_string()).unwrap();

    touchline(&data_dir)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration: committed"));

    touchline(&data_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legacy FC"));
}

fn write_legacy(data_dir: &TempDir, entries: serde_json::Value) {
    std::fs::write(data_dir.path().join("legacy.json"), entries.to_string()).unwrap();
}

#[test]
fn test_unreadable_legacy_data_keeps_cli_usable() {
    let data_dir = TempDir::new().unwrap();
    write_legacy(&data_dir, serde_json::json!({ "soccerTeamsIndex": "{not json" }));

    touchline(&data_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No teams found."))
        .stderr(predicate::str::contains("touchline migrate"));

    touchline(&data_dir)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend: legacy"))
        .stdout(predicate::str::contains("Migration: rolled back"));
}

#[test]
fn test_failed_migration_still_lists_legacy_teams() {
    let data_dir = TempDir::new().unwrap();
    write_legacy(
        &data_dir,
        serde_json::json!({
            "soccerTeamsIndex": serde_json::json!({
                "team_1": {"id": "team_1", "name": "Legacy FC"}
            })
            .to_string(),
            "savedSoccerGames": "{not json"
        }),
    );

    touchline(&data_dir)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legacy FC"))
        .stdout(predicate::str::contains("1 team(s)"));

    touchline(&data_dir)
        .args(["migrate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Migration failed"));
}
