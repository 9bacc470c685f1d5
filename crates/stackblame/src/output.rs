// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rendering lookup results

use std::io::{self, Write};

use serde::Serialize;
use stackblame_git::RangeSpec;
use stackblame_trace::{StackFrame, Traceback};

use crate::correlate::{LookupResults, MatchKind, ScoredResult};

/// Everything a lookup produced, in the shape printed by `--json`
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Range that was searched
    pub range: &'a RangeSpec,
    /// Parsed frames
    pub frames: &'a [StackFrame],
    /// Ranked commits, best first
    pub results: &'a LookupResults,
}

impl<'a> Report<'a> {
    /// Bundle a lookup for printing
    #[must_use]
    pub fn new(trace: &'a Traceback, range: &'a RangeSpec, results: &'a LookupResults) -> Self {
        Self {
            range,
            frames: trace.frames(),
            results,
        }
    }
}

/// Print the report as pretty JSON followed by a newline
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_json(out: &mut impl Write, report: &Report<'_>) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// Print the report for a terminal
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render_text(
    out: &mut impl Write,
    trace: &Traceback,
    report: &Report<'_>,
) -> io::Result<()> {
    writeln!(out, "Traceback:")?;
    for line in trace.to_string().lines() {
        writeln!(out, "  {line}")?;
    }
    writeln!(out)?;
    writeln!(out, "Commit range: {}", report.range)?;
    writeln!(out)?;

    if report.results.is_empty() {
        return writeln!(out, "No matches found");
    }
    for (i, result) in report.results.sorted().iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        render_result(out, report.frames, result)?;
    }
    Ok(())
}

fn render_result(out: &mut impl Write, frames: &[StackFrame], result: &ScoredResult) -> io::Result<()> {
    let commit = &result.commit;
    writeln!(out, "commit {}", commit.sha)?;
    writeln!(out, "Date:    {}", commit.timestamp.format("%a %b %-d %H:%M:%S %Y %z"))?;
    writeln!(out, "Author:  {} <{}>", commit.author, commit.author_email)?;
    writeln!(out, "Subject: {}", commit.subject())?;
    writeln!(
        out,
        "Score:   {} ({} of {} frames)",
        result.total_score,
        result.contributing_frames.len(),
        frames.len()
    )?;

    for index in &result.contributing_frames {
        let kinds: Vec<&str> = result
            .matches
            .iter()
            .filter(|m| m.frame_index == *index)
            .map(|m| match m.kind {
                MatchKind::Blame => "blame",
                MatchKind::Pickaxe => "pickaxe",
            })
            .collect();
        match frames.get(*index) {
            Some(frame) => writeln!(
                out,
                "    #{index} {}:{} [{}]",
                frame.file_path,
                frame.line_number,
                kinds.join(", ")
            )?,
            None => writeln!(out, "    #{index} [{}]", kinds.join(", "))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::{Candidate, rank};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use similar_asserts::assert_eq;
    use stackblame_git::CommitRef;

    const TRACE: &str = "ZeroDivisionError: division by zero\n  \
                         File \"shop/cart.py\", line 4, in total\n  \
                         File \"shop/api.py\", line 9, in checkout\n";

    fn commit() -> CommitRef {
        CommitRef {
            sha: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            message: "Average over items\n\nbody".to_string(),
            author: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 8, 30, 0).unwrap(),
            parents: vec![],
        }
    }

    fn render(results: &LookupResults) -> String {
        let trace = stackblame_trace::parse_str(TRACE).unwrap();
        let range = RangeSpec::explicit("v1.0..HEAD");
        let report = Report::new(&trace, &range, results);
        let mut out = Vec::new();
        render_text(&mut out, &trace, &report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_text_no_matches() {
        let text = render(&LookupResults::default());
        assert!(text.contains("Commit range: v1.0..HEAD\n"));
        assert!(text.ends_with("No matches found\n"));
    }

    #[test]
    fn test_render_text_result() {
        let results = rank([
            Candidate::new(commit(), 0, MatchKind::Blame),
            Candidate::new(commit(), 0, MatchKind::Pickaxe),
            Candidate::new(commit(), 1, MatchKind::Pickaxe),
        ]);
        let text = render(&results);
        let expected = "\
commit 1945ab9c752534e733c38ba0109dc3b741f0a6eb
Date:    Fri May 1 08:30:00 2026 +0000
Author:  Test Author <test@example.com>
Subject: Average over items
Score:   5 (2 of 2 frames)
    #0 shop/cart.py:4 [blame, pickaxe]
    #1 shop/api.py:9 [pickaxe]
";
        assert!(text.ends_with(expected), "unexpected output:\n{text}");
    }

    #[test]
    fn test_render_json_shape() {
        let trace = stackblame_trace::parse_str(TRACE).unwrap();
        let range = RangeSpec::explicit("v1.0..HEAD");
        let results = rank([Candidate::new(commit(), 1, MatchKind::Blame)]);
        let mut out = Vec::new();
        render_json(&mut out, &Report::new(&trace, &range, &results)).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["range"], json!({ "explicit": "v1.0..HEAD" }));
        assert_eq!(json["frames"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["frames"][1]["file_path"], json!("shop/api.py"));
        let best = &json["results"][0];
        assert_eq!(best["total_score"], json!(3));
        assert_eq!(best["contributing_frames"], json!([1]));
        assert_eq!(best["matches"], json!([{ "frame_index": 1, "kind": "blame" }]));
    }
}
