//! End-to-end tests of the `tledger` binary against a temp store

mod common;

use common::TestStore;
use predicates::prelude::*;
use std::fs;

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_displays() {
    let store = TestStore::new();
    store
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("test cases"));
}

#[test]
fn test_unknown_command_fails() {
    let store = TestStore::new();
    store
        .cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_first_run_seeds_store_file() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Qualis SPC"))
        .stdout(predicate::str::contains("5 product(s) found"));

    let content = fs::read_to_string(store.path()).unwrap();
    assert!(content.contains("testCases"));
    assert!(content.contains("productModules"));
}

// ============================================================================
// Products, versions, modules
// ============================================================================

#[test]
fn test_product_and_version_flow() {
    let store = TestStore::new();
    let product = store.created_id(&["product", "add", "Gateway", "-d", "Edge service"]);

    store
        .cmd()
        .args(["version", "add", "v2.0", "--product", &product])
        .assert()
        .success();
    // same version again is a no-op
    store
        .cmd()
        .args(["version", "add", "v2.0", "--product", &product])
        .assert()
        .success();

    let versions = store.json(&["version", "list", "--product", &product]);
    let listed: Vec<&str> = versions
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["version"].as_str())
        .collect();
    assert_eq!(listed, vec!["v2.0"]);
}

#[test]
fn test_product_remove_accepts_prefixed_id() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["product", "update", "p1", "--name", "Qualis"])
        .assert()
        .success();
    store
        .cmd()
        .args(["product", "remove", "p1"])
        .assert()
        .success();

    store
        .cmd()
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 product(s) found"));
}

#[test]
fn test_version_add_rejects_bad_format() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["version", "add", "2.0", "--product", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2.0"));
}

#[test]
fn test_module_add_and_list_by_version() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["module", "add", "Billing", "--product", "1", "--version", "v3.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing"));

    store
        .cmd()
        .args(["module", "list", "--product", "1", "--version", "v3.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing"))
        .stdout(predicate::str::contains("Login Module").not());
}

#[test]
fn test_module_remove_cascades_to_cases() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["module", "remove", "mod1"])
        .assert()
        .success();

    store
        .cmd()
        .args(["case", "list", "--module", "mod1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No test cases found."));
}

// ============================================================================
// Test cases
// ============================================================================

#[test]
fn test_case_add_defaults_to_module_version() {
    let store = TestStore::new();
    let case = store.json(&[
        "case",
        "add",
        "--module",
        "mod3",
        "-u",
        "Edit profile",
        "--step",
        "Open profile",
        "--expected",
        "Form shown",
    ]);

    assert_eq!(case["version"], "v1.0");
    assert_eq!(case["moduleId"], "mod3");
    assert_eq!(case["steps"].as_array().unwrap().len(), 1);
}

#[test]
fn test_case_add_unknown_module_fails() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["case", "add", "--module", "nope", "--version", "v1.0"])
        .assert()
        .failure();
}

#[test]
fn test_case_set_result_and_filter() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["case", "set", "4", "--result", "Blocked"])
        .assert()
        .success();

    store
        .cmd()
        .args(["case", "list", "--result", "blocked"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TC110"));
}

#[test]
fn test_case_steps_lifecycle() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["case", "step-add", "4", "Save profile", "-e", "Saved"])
        .assert()
        .success();

    let case = store.json(&["case", "show", "4"]);
    assert_eq!(case["steps"].as_array().unwrap().len(), 2);

    store
        .cmd()
        .args(["case", "step-remove", "4", "1"])
        .assert()
        .success();
    let case = store.json(&["case", "show", "4"]);
    assert_eq!(case["steps"][0]["steps"], "Save profile");
}

// ============================================================================
// Suites and runs
// ============================================================================

#[test]
fn test_suite_and_run_flow() {
    let store = TestStore::new();
    let suite = store.created_id(&["suite", "add", "Smoke", "--product", "2"]);

    store
        .cmd()
        .args(["suite", "add-case", &suite, "4"])
        .assert()
        .success();
    store
        .cmd()
        .args(["suite", "add-case", &suite, "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in suite"));

    let run = store.created_id(&["run", "new", "Nightly", "--suite", &suite]);
    store
        .cmd()
        .args(["run", "record", &run, "4", "pass"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed"));

    let stats = store.json(&["run", "stats", &run]);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["passed"], 1);
    assert_eq!(stats["completion"], 100);

    // recording in a run leaves the stored case untouched
    let case = store.json(&["case", "show", "4"]);
    assert_ne!(case["result"], "Pass");
}

#[test]
fn test_run_show_reports_seeded_run() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["run", "show", "run1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login Test Suite"))
        .stdout(predicate::str::contains("TC101"));
}

#[test]
fn test_run_rename_keeps_explicit_status() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["run", "update", "run1", "--status", "Blocked"])
        .assert()
        .success();
    store
        .cmd()
        .args(["run", "update", "run1", "--name", "Login regression"])
        .assert()
        .success();

    let run = store.json(&["run", "show", "run1"]);
    assert_eq!(run["run"]["name"], "Login regression");
    assert_eq!(run["run"]["status"], "Blocked");
}

#[test]
fn test_run_new_requires_known_suite() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["run", "new", "Broken", "--suite", "missing"])
        .assert()
        .failure();
}

// ============================================================================
// Summary and check
// ============================================================================

#[test]
fn test_summary_shows_matrix() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["summary", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login Module"))
        .stdout(predicate::str::contains("v1.1"))
        .stdout(predicate::str::contains("TOTAL"));
}

#[test]
fn test_check_seeded_workspace_is_consistent() {
    let store = TestStore::new();
    store
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workspace is consistent"));
}

#[test]
fn test_check_strict_fails_on_broken_suite_ref() {
    let store = TestStore::new();
    // TC101 is referenced by suite1
    store.cmd().args(["case", "remove", "1"]).assert().success();

    store
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("suite suite1 references missing test case TC101"));
    store
        .cmd()
        .args(["check", "--strict"])
        .assert()
        .failure();
}

// ============================================================================
// Import, export, reset, completions
// ============================================================================

#[test]
fn test_import_csv_into_module() {
    let store = TestStore::new();
    let sheet = store.dir.path().join("login_cases.csv");
    fs::write(
        &sheet,
        "Test Case ID,Use Case,Steps,Expected,Browser\n\
         TC900,Login ok,Enter creds,Dashboard,firefox\n\
         ,Login bad,Enter wrong creds,Error shown,chrome\n",
    )
    .unwrap();

    store
        .cmd()
        .args(["import"])
        .arg(&sheet)
        .args(["--module", "mod1", "--attributes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported"));

    let cases = store.json(&["case", "list", "--module", "mod1"]);
    let ids: Vec<&str> = cases
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["testCaseId"].as_str())
        .collect();
    assert!(ids.contains(&"TC900"));
    assert!(ids.contains(&"TC2"));
}

#[test]
fn test_import_with_product_creates_module() {
    let store = TestStore::new();
    let sheet = store.dir.path().join("checkout_flow.csv");
    fs::write(&sheet, "Use Case,Version\nPay by card,v1.2\n").unwrap();

    store
        .cmd()
        .args(["import"])
        .arg(&sheet)
        .args(["--product", "2"])
        .assert()
        .success();

    store
        .cmd()
        .args(["module", "list", "--product", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkout Flow"));
}

#[test]
fn test_export_suite_to_file() {
    let store = TestStore::new();
    let out = store.dir.path().join("suite.csv");

    store
        .cmd()
        .args(["export", "--suite", "suite1", "--out"])
        .arg(&out)
        .assert()
        .success();

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.starts_with("Test Case ID,Module,Version"));
    assert!(content.contains("TC101"));
}

#[test]
fn test_export_run_to_stdout() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["export", "--run", "run1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Suite,Test Case ID"))
        .stdout(predicate::str::contains("Login Test Suite"));
}

#[test]
fn test_reset_restores_sample_data() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["product", "remove", "1"])
        .assert()
        .success();

    store
        .cmd()
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored sample data"));

    store
        .cmd()
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Qualis SPC"));
}

#[test]
fn test_completions_bash() {
    let store = TestStore::new();
    store
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tledger"));
}
