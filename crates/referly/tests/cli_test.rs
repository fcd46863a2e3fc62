//! End-to-end CLI tests: argument parsing, exit codes, and the
//! config/session commands, all against an isolated HOME.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Build a `referly` command with config, session, and env isolated to
/// the given directory.
fn referly(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("referly").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env_remove("REFERLY_PROFILE")
        .env_remove("REFERLY_BACKEND")
        .env_remove("REFERLY_AFFILIATE")
        .env_remove("REFERLY_OUTPUT")
        .env_remove("REFERLY_INSECURE")
        .env_remove("REFERLY_TIMEOUT")
        .env_remove("REFERLY_EMAIL")
        .env_remove("REFERLY_PASSWORD")
        .env_remove("NO_COLOR");
    cmd
}

#[test]
fn no_args_shows_usage() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("codes")
                .and(predicate::str::contains("stats"))
                .and(predicate::str::contains("series"))
                .and(predicate::str::contains("login")),
        );
}

#[test]
fn version_flag_works() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("referly"));
}

#[test]
fn codes_help_shows_sort_option() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .args(["codes", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sort").and(predicate::str::contains("--filter")));
}

#[test]
fn invalid_output_format_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .args(["stats", "-o", "yaml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn whoami_without_session_exits_auth() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .arg("whoami")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_without_session_is_fine() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn config_path_prints_a_path() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn codes_without_config_fails_with_hint() {
    let home = tempfile::tempdir().unwrap();
    referly(home.path())
        .arg("codes")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn config_init_then_show_round_trips() {
    let home = tempfile::tempdir().unwrap();

    referly(home.path())
        .args([
            "config",
            "init",
            "--backend",
            "https://api.example.com/",
            "--email",
            "affiliate@example.com",
            "--name",
            "staging",
            "--default",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'staging' saved"));

    referly(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("staging")
                .and(predicate::str::contains("https://api.example.com/"))
                .and(predicate::str::contains("affiliate@example.com")),
        );
}

#[test]
fn config_show_redacts_passwords() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config/referly");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
default_profile = "default"

[profiles.default]
backend = "https://api.example.com/"
email = "a@example.com"
password = "hunter2"
"#,
    )
    .unwrap();

    referly(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<redacted>")
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn unreachable_backend_fails_cleanly() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join(".config/referly");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        r#"
default_profile = "default"

[profiles.default]
backend = "https://api.invalid./"
email = "a@example.com"
password = "pw"
"#,
    )
    .unwrap();

    referly(home.path())
        .args(["codes", "--timeout", "1"])
        .assert()
        .failure();
}
