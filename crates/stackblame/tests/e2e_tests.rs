// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end tests against real git history
//!
//! Each test builds this history in a scratch repository:
//!
//! | commit | change                         |
//! |--------|--------------------------------|
//! | c0     | add `README.md`                |
//! | c1     | add `billing/invoice.py`       |
//! | c2     | edit `README.md`               |
//! | c3     | add `docs/notes.md`            |
//!
//! and searches the range `c0..HEAD`, i.e. commits c1, c2 and c3.

mod fixtures;

use serde_json::Value;
use similar_asserts::assert_eq;
use stackblame::Error;
use stackblame::correlate::{BLAME_WEIGHT, PICKAXE_WEIGHT, lookup};
use stackblame_git::{GitBackend, RangeSpec};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use stackblame_trace::parse_str;

use fixtures::{INVOICE_PY, INVOICE_TRACE};
use test_utils::{TempTestDir, TestGitRepo, run_stackblame};

struct History {
    repo: TestGitRepo,
    c0: String,
    c1: String,
}

impl History {
    fn new(name: &str) -> Self {
        let mut repo = TestGitRepo::new(name);
        let c0 = repo.commit(&[("README.md", "# Billing\n")], "Initial commit");
        let c1 = repo.commit(&[("billing/invoice.py", INVOICE_PY)], "Average invoice totals");
        repo.commit(&[("README.md", "# Billing\n\nInvoices.\n")], "Describe project");
        repo.commit(&[("docs/notes.md", "notes\n")], "Add notes");
        Self { repo, c0, c1 }
    }

    fn range(&self) -> String {
        format!("{}..HEAD", self.c0)
    }

    fn repo_arg(&self) -> &str {
        self.repo.path().to_str().expect("utf-8 temp path")
    }
}

const JAVA_TRACE: &str = "\
Exception in thread \"main\" java.lang.IllegalStateException: closed
\tat com.acme.ledger.Journal.post(Journal.java:88)
\tat com.acme.ledger.Batch.flush(Batch.java:21)
";

// ============================================================================
// Library
// ============================================================================

#[test]
fn test_lookup_with_git_backend() {
    let history = History::new("lib-lookup");
    let backend = GitBackend::open(history.repo.path()).expect("open repo");
    let trace = parse_str(INVOICE_TRACE).unwrap();

    let results = lookup(&backend, &trace, &RangeSpec::explicit(history.range()), false).unwrap();

    assert_eq!(results.len(), 1);
    let top = &results.sorted()[0];
    assert_eq!(top.commit.sha, history.c1);
    // Both lines were written by c1, which also added both printed lines
    assert_eq!(top.total_score, 2 * (BLAME_WEIGHT + PICKAXE_WEIGHT));
    assert_eq!(top.contributing_frames.len(), 2);
}

#[test]
fn test_lookup_ignores_same_code_in_other_files() {
    let mut repo = TestGitRepo::new("lib-other-file");
    let c0 = repo.commit(&[("README.md", "# Billing\n")], "Initial commit");
    let c1 = repo.commit(&[("billing/invoice.py", INVOICE_PY)], "Average invoice totals");
    repo.commit(
        &[("docs/howto.md", "Call it as:\n\n    total = compute(lines)\n")],
        "Document compute",
    );
    let backend = GitBackend::open(repo.path()).expect("open repo");
    let trace = parse_str(INVOICE_TRACE).unwrap();

    let results = lookup(&backend, &trace, &RangeSpec::explicit(format!("{c0}..HEAD")), false).unwrap();

    let shas: Vec<&str> = results.sorted().iter().map(|r| r.commit.sha.as_str()).collect();
    assert_eq!(shas, vec![c1.as_str()]);
}

#[test]
fn test_interrupted_scan_cancels_lookup() {
    let history = History::new("lib-interrupt");
    let backend = GitBackend::open(history.repo.path())
        .expect("open repo")
        .with_interrupt(Arc::new(AtomicBool::new(true)));
    let trace = parse_str(INVOICE_TRACE).unwrap();

    let err = lookup(&backend, &trace, &RangeSpec::explicit(history.range()), false).unwrap_err();

    assert!(matches!(err, Error::Cancelled), "unexpected error: {err}");
}

#[test]
fn test_lookup_with_git_backend_no_matches() {
    let history = History::new("lib-empty");
    let backend = GitBackend::open(history.repo.path()).expect("open repo");
    let trace = parse_str(JAVA_TRACE).unwrap();

    let results = lookup(&backend, &trace, &RangeSpec::explicit(history.range()), true).unwrap();

    assert!(results.is_empty());
}

// ============================================================================
// Binary
// ============================================================================

#[test]
fn test_cli_json_output() {
    let history = History::new("cli-json");
    let input = TempTestDir::new("cli-json-input");
    let trace = input.create_file("trace.txt", INVOICE_TRACE);

    let output = run_stackblame(&[
        "-C",
        history.repo_arg(),
        "-i",
        trace.to_str().unwrap(),
        "--json",
        "-q",
        &history.range(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["range"]["explicit"], Value::String(history.range()));
    assert_eq!(json["frames"].as_array().map(Vec::len), Some(2));
    let results = json["results"].as_array().expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["commit"]["sha"], Value::String(history.c1.clone()));
    assert_eq!(
        results[0]["contributing_frames"],
        serde_json::json!([0, 1])
    );
}

#[test]
fn test_cli_text_output() {
    let history = History::new("cli-text");
    let input = TempTestDir::new("cli-text-input");
    let trace = input.create_file("trace.txt", INVOICE_TRACE);

    let output = run_stackblame(&[
        "--repo",
        history.repo_arg(),
        "--input",
        trace.to_str().unwrap(),
        "--fast",
        &history.range(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("commit {}", history.c1)));
    assert!(stdout.contains("Subject: Average invoice totals"));
    assert!(stdout.contains("#1 /srv/app/billing/invoice.py:8 [blame, pickaxe]"));
}

#[test]
fn test_cli_no_matches_is_success() {
    let history = History::new("cli-none");
    let input = TempTestDir::new("cli-none-input");
    let trace = input.create_file("trace.txt", JAVA_TRACE);

    let output = run_stackblame(&[
        "-C",
        history.repo_arg(),
        "-i",
        trace.to_str().unwrap(),
        &history.range(),
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).ends_with("No matches found\n"));
}

#[test]
fn test_cli_empty_range_fails() {
    let history = History::new("cli-empty-range");
    let input = TempTestDir::new("cli-empty-range-input");
    let trace = input.create_file("trace.txt", INVOICE_TRACE);

    let output = run_stackblame(&[
        "-C",
        history.repo_arg(),
        "-i",
        trace.to_str().unwrap(),
        "HEAD..HEAD",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("contains no commits"));
}

#[test]
fn test_cli_missing_range_fails() {
    let history = History::new("cli-missing-range");
    let output = run_stackblame(&["-C", history.repo_arg()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("A commit range is required"));
}

#[test]
fn test_cli_blank_input_fails() {
    let history = History::new("cli-blank");
    let input = TempTestDir::new("cli-blank-input");
    let trace = input.create_file("trace.txt", "\n  \n");

    let output = run_stackblame(&[
        "-C",
        history.repo_arg(),
        "-i",
        trace.to_str().unwrap(),
        &history.range(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty input"));
}

#[test]
fn test_cli_unparseable_input_fails() {
    let history = History::new("cli-noframes");
    let input = TempTestDir::new("cli-noframes-input");
    let trace = input.create_file("trace.txt", "INFO server started\nINFO ready\n");

    let output = run_stackblame(&[
        "-C",
        history.repo_arg(),
        "-i",
        trace.to_str().unwrap(),
        &history.range(),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_version() {
    let output = run_stackblame(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("stackblame "));
}
