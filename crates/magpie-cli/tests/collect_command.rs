use assert_cmd::Command;
use predicates::prelude::*;

fn magpie() -> Command {
    Command::cargo_bin("magpie").unwrap()
}

#[test]
fn test_collect_help_lists_parameters() {
    let mut cmd = magpie();
    cmd.arg("collect").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("QUERY"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--min-posts"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--batch-wait"))
        .stdout(predicate::str::contains("--max-scroll-attempts"))
        .stdout(predicate::str::contains("--headed"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_collect_requires_credentials() {
    let mut cmd = magpie();
    cmd.arg("collect")
        .arg("galamsey")
        .env_remove("X_USERNAME")
        .env_remove("X_PASSWORD");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

#[test]
fn test_collect_fails_fast_without_browser() {
    // Credentials are provided so the run gets as far as browser discovery,
    // which is pointed at a path that cannot exist.
    let mut cmd = magpie();
    cmd.arg("collect")
        .arg("galamsey")
        .arg("--browser-path")
        .arg("/nonexistent/brave")
        .env("X_USERNAME", "someone")
        .env("X_PASSWORD", "secret");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_collect_parameter_values_parse() {
    // Flags should parse; the run still fails on the bogus browser path.
    let mut cmd = magpie();
    cmd.arg("collect")
        .arg("galamsey")
        .arg("--output")
        .arg("out.csv")
        .arg("--min-posts")
        .arg("50")
        .arg("--batch-size")
        .arg("10")
        .arg("--batch-wait")
        .arg("1")
        .arg("--max-scroll-attempts")
        .arg("5")
        .arg("--browser-path")
        .arg("/nonexistent/brave")
        .env("X_USERNAME", "someone")
        .env("X_PASSWORD", "secret");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_collect_rejects_non_numeric_min_posts() {
    let mut cmd = magpie();
    cmd.arg("collect")
        .arg("galamsey")
        .arg("--min-posts")
        .arg("plenty")
        .env("X_USERNAME", "someone")
        .env("X_PASSWORD", "secret");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
