//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn primegen() -> Command {
    Command::cargo_bin("primegen").unwrap()
}

// --- Help and arg validation ---

#[test]
fn help_shows_all_subcommands() {
    primegen().arg("--help").assert().success().stdout(
        predicate::str::contains("count")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("first"))
            .and(predicate::str::contains("summary"))
            .and(predicate::str::contains("--threads"))
            .and(predicate::str::contains("--serial")),
    );
}

#[test]
fn count_requires_high() {
    primegen()
        .arg("count")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--high"));
}

#[test]
fn check_requires_values() {
    primegen().arg("check").assert().failure();
}

// --- Queries ---

#[test]
fn count_primes_below_one_thousand() {
    primegen()
        .args(["count", "--low", "1", "--high", "1000"])
        .assert()
        .success()
        .stdout("168\n");
}

#[test]
fn count_serial_matches_default() {
    primegen()
        .args(["--serial", "count", "--high", "100000"])
        .assert()
        .success()
        .stdout("9592\n");
    primegen()
        .args(["--threads", "2", "count", "--high", "100000"])
        .assert()
        .success()
        .stdout("9592\n");
}

#[test]
fn list_range_one_per_line() {
    primegen()
        .args(["list", "--low", "10", "--high", "30"])
        .assert()
        .success()
        .stdout("11\n13\n17\n19\n23\n29\n");
}

#[test]
fn list_json() {
    primegen()
        .args(["list", "--low", "1", "--high", "20", "--json"])
        .assert()
        .success()
        .stdout("[2,3,5,7,11,13,17,19]\n");
}

#[test]
fn check_classifies_each_value() {
    primegen()
        .args(["check", "97", "100", "1", "2"])
        .assert()
        .success()
        .stdout("97: prime\n100: not prime\n1: not prime\n2: prime\n");
}

#[test]
fn check_above_explicit_high_fails() {
    primegen()
        .args(["check", "50", "--high", "20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the sieved range"));
}

#[test]
fn first_odd_primes() {
    primegen()
        .args(["first", "--n", "5", "--start", "3"])
        .assert()
        .success()
        .stdout("3\n5\n7\n11\n13\n");
}

#[test]
fn first_json() {
    primegen()
        .args(["first", "--n", "4", "--json"])
        .assert()
        .success()
        .stdout("[2,3,5,7]\n");
}

#[test]
fn summary_is_json() {
    let output = primegen()
        .args(["summary", "--low", "10", "--high", "30"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["low"], 10);
    assert_eq!(summary["high"], 30);
    assert_eq!(summary["count"], 6);
    assert_eq!(summary["first"], 11);
    assert_eq!(summary["last"], 29);
    assert!(summary["elapsed_ms"].is_u64());
}

#[test]
fn summary_of_prime_free_range_has_null_ends() {
    let output = primegen()
        .args(["summary", "--low", "24", "--high", "29"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["count"], 0);
    assert!(summary["first"].is_null());
    assert!(summary["last"].is_null());
}

// --- Configuration and logging ---

/// Parse every stderr line as a JSON log record.
fn json_log_lines(stderr: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(|line| {
            serde_json::from_str(line)
                .unwrap_or_else(|e| panic!("stderr line is not JSON ({}): {}", e, line))
        })
        .collect()
}

/// Strategies recorded by the "building prime table" debug events.
fn logged_strategies(records: &[serde_json::Value]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r["fields"]["message"] == "building prime table")
        .map(|r| r["fields"]["strategy"].as_str().unwrap().to_owned())
        .collect()
}

#[test]
fn threads_from_environment() {
    primegen()
        .env("PRIMEGEN_THREADS", "2")
        .args(["count", "--high", "100000"])
        .assert()
        .success()
        .stdout("9592\n")
        .stderr(predicate::str::contains("rayon thread pool configured"));
}

#[test]
fn json_log_format_emits_json_lines() {
    let output = primegen()
        .env("LOG_FORMAT", "json")
        .env("RUST_LOG", "debug")
        .args(["count", "--high", "1000"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "168\n");
    let records = json_log_lines(&output.stderr);
    assert!(!records.is_empty(), "expected debug records on stderr");
    assert!(records.iter().all(|r| r["level"].is_string()));
    assert!(records
        .iter()
        .any(|r| r["fields"]["message"] == "prime table ready"));
}

/// `first` builds tables above the parallel threshold here; `--serial` must
/// still reach every one of them.
#[test]
fn serial_flag_applies_to_first() {
    let output = primegen()
        .env("LOG_FORMAT", "json")
        .env("RUST_LOG", "debug")
        .args(["--serial", "first", "--n", "300000", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let strategies = logged_strategies(&json_log_lines(&output.stderr));
    assert!(!strategies.is_empty());
    assert!(strategies.iter().all(|s| s == "serial"), "{:?}", strategies);

    let primes: Vec<u64> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(primes.len(), 300_000);
    assert_eq!(primes[299_999], 4_256_233);
}

#[test]
fn first_without_serial_goes_parallel_when_large() {
    let output = primegen()
        .env("LOG_FORMAT", "json")
        .env("RUST_LOG", "debug")
        .args(["first", "--n", "300000", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let strategies = logged_strategies(&json_log_lines(&output.stderr));
    assert!(strategies.iter().any(|s| s == "parallel"), "{:?}", strategies);
}

// --- Errors ---

#[test]
fn inverted_range_fails() {
    primegen()
        .args(["count", "--low", "30", "--high", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid range"));
}
