// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for lookups

use std::fmt;

use rayon::ThreadPoolBuildError;
use stackblame_git::{GitError, RangeSpec};
use stackblame_trace::TraceError;
use thiserror::Error;

/// Problems with the commit range a user asked for
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Both an explicit range and a date were given
    #[error("Give either a commit range or --since, not both")]
    Conflicting,

    /// Neither an explicit range nor a date was given
    #[error("A commit range is required. Pass RANGE (e.g. v1.2..HEAD) or --since DATE")]
    Missing,

    /// `--branch` only applies to date ranges
    #[error("--branch can only be used together with --since")]
    BranchWithoutSince,

    /// The range resolved to zero commits
    #[error("Commit range {range} contains no commits")]
    Empty {
        /// The offending range
        range: RangeSpec,
    },
}

/// Which history query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Finding the tracked file a frame points at
    Locate,
    /// Reading the frame's line from the working tree
    LineContent,
    /// Last modifier of the frame's line
    Blame,
    /// Commits that added or removed the frame's text
    Pickaxe,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locate => "locate",
            Self::LineContent => "line content",
            Self::Blame => "blame",
            Self::Pickaxe => "pickaxe",
        })
    }
}

/// Errors that abort a lookup
#[derive(Debug, Error)]
pub enum Error {
    /// The input held text but no stack frames
    #[error(transparent)]
    Parse(#[from] TraceError),

    /// The commit range is missing, ambiguous or empty
    #[error(transparent)]
    Range(#[from] RangeError),

    /// The history could not be read while checking the range
    #[error("Cannot read history for range {range}: {source}")]
    BackendUnavailable {
        /// Range being checked
        range: RangeSpec,
        /// Underlying backend error
        source: GitError,
    },

    /// A per-frame query failed
    #[error("{kind} query for frame #{frame} ({path}) in range {range} failed: {source}")]
    Query {
        /// Index of the frame being looked up
        frame: usize,
        /// Query that failed
        kind: QueryKind,
        /// File path the query was about
        path: String,
        /// Range being searched
        range: RangeSpec,
        /// Underlying backend error
        source: GitError,
    },

    /// The lookup was interrupted
    #[error("Lookup cancelled")]
    Cancelled,

    /// The query worker pool could not be started
    #[error("Failed to start {jobs} query workers: {source}")]
    WorkerPool {
        /// Requested worker count
        jobs: usize,
        /// Underlying rayon error
        source: ThreadPoolBuildError,
    },
}
