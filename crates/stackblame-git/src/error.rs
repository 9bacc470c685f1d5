// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for stackblame-git

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during history queries
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Invalid commit reference (branch, tag, SHA, or range)
    #[error("Invalid commit reference: {reference}")]
    InvalidReference {
        /// The reference string that could not be resolved
        reference: String,
    },

    /// The `git` executable failed or could not be started
    #[error("`{command}` failed: {message}")]
    Command {
        /// The command line that was run
        command: String,
        /// Exit status or stderr of the command
        message: String,
    },

    /// Error reading the working tree
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query ran past its time limit
    #[error("{query} timed out after {elapsed:?}")]
    Timeout {
        /// Description of the query
        query: String,
        /// Time spent before giving up
        elapsed: Duration,
    },

    /// A query was stopped by its interrupt flag
    #[error("{query} was interrupted")]
    Interrupted {
        /// Description of the query
        query: String,
    },
}

impl GitError {
    /// Whether the error means the range itself does not resolve, as opposed
    /// to the backend being unreachable
    #[must_use]
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidReference { .. })
    }
}
