//! CLI tests against the acme fixtures

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/acme")
}

fn rolesync() -> Command {
    let mut cmd = Command::cargo_bin("rolesync").unwrap();
    cmd.current_dir(fixtures())
        .env_remove("RUST_LOG")
        .env_remove("ROLESYNC_CONFIG")
        .env_remove("ROLESYNC_STATE")
        .env_remove("ROLESYNC_DIRECTORY");
    cmd
}

#[test]
fn test_acme_script() {
    rolesync()
        .args(["--state", "state.yml", "--directory", "ldap.yml", "--real"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE ROLE \"carol\" WITH LOGIN"))
        .stdout(predicate::str::contains(
            "\\connect app\n-- Reassign objects of legacy to postgres in app\n",
        ))
        .stdout(predicate::str::contains(
            "GRANT USAGE ON SCHEMA \"sales\" TO \"readers\";",
        ));
}

#[test]
fn test_acme_check_pending() {
    rolesync()
        .args(["--state", "state.yml", "--directory", "ldap.yml", "--check"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Would generate 18 queries"));
}

#[test]
fn test_acme_synced_state_is_stable() {
    rolesync()
        .args(["--state", "state-synced.yml", "--directory", "ldap.yml", "--check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Nothing to do"));
}
