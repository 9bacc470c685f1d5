// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit ranges

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bounded slice of history that queries are scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSpec {
    /// A revision or revision range in git syntax (`v1.2..HEAD`, `main`)
    Explicit(String),
    /// Commits reachable from `branch` (or `HEAD`) newer than `date`
    ///
    /// The date is passed to git verbatim, so any expression git's date
    /// parser accepts (`2 weeks ago`, `2026-01-01`, `yesterday`) works.
    Since {
        /// Date expression
        date: String,
        /// Branch to walk; `HEAD` when absent
        branch: Option<String>,
    },
}

impl RangeSpec {
    /// An explicit revision range
    #[must_use]
    pub fn explicit(range: impl Into<String>) -> Self {
        Self::Explicit(range.into())
    }

    /// A date-bounded range on a branch
    #[must_use]
    pub fn since(date: impl Into<String>, branch: Option<&str>) -> Self {
        Self::Since {
            date: date.into(),
            branch: branch.map(str::to_string),
        }
    }

    /// The revision the range walks from: the right side of `a..b`, the
    /// branch of a date range, or `HEAD`
    #[must_use]
    pub fn tip(&self) -> &str {
        match self {
            Self::Explicit(range) => match range.rsplit_once("..") {
                Some((_, tip)) => {
                    let tip = tip.trim_start_matches('.');
                    if tip.is_empty() { "HEAD" } else { tip }
                }
                None => range,
            },
            Self::Since { branch, .. } => branch.as_deref().unwrap_or("HEAD"),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(range) => f.write_str(range),
            Self::Since { date, branch } => {
                write!(f, "{} --since={:?}", branch.as_deref().unwrap_or("HEAD"), date)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_tip() {
        assert_eq!(RangeSpec::explicit("v1.0..main").tip(), "main");
        assert_eq!(RangeSpec::explicit("v1.0...feature").tip(), "feature");
        assert_eq!(RangeSpec::explicit("v1.0..").tip(), "HEAD");
        assert_eq!(RangeSpec::explicit("abc123").tip(), "abc123");
        assert_eq!(RangeSpec::since("1 week ago", None).tip(), "HEAD");
        assert_eq!(RangeSpec::since("1 week ago", Some("release")).tip(), "release");
    }

    #[test]
    fn test_display() {
        assert_eq!(RangeSpec::explicit("a..b").to_string(), "a..b");
        assert_eq!(
            RangeSpec::since("2 weeks ago", Some("main")).to_string(),
            "main --since=\"2 weeks ago\""
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(RangeSpec::since("yesterday", None)).expect("serialize");
        assert_eq!(json["since"]["date"], serde_json::json!("yesterday"));
        let json = serde_json::to_value(RangeSpec::explicit("HEAD~3..HEAD")).expect("serialize");
        assert_eq!(json["explicit"], serde_json::json!("HEAD~3..HEAD"));
    }
}
