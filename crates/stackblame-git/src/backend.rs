// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The history query capability the correlator depends on
//!
//! Two implementations ship with this crate: [`GitBackend`](crate::GitBackend)
//! reads a real repository, [`MemoryBackend`](crate::MemoryBackend) answers
//! from tables built in tests.

use crate::commit::CommitRef;
use crate::error::GitError;
use crate::range::RangeSpec;

/// Read-only history queries
///
/// Implementations must be safe to call from several threads at once; the
/// correlator issues queries for different frames concurrently.
///
/// "Found nothing" is always `Ok(None)` or an empty vector. An `Err` means
/// the history could not be read at all.
pub trait HistoryBackend: Send + Sync {
    /// Number of commits in `range`
    ///
    /// # Errors
    ///
    /// Returns `GitError::InvalidReference` if the range does not resolve.
    fn count_commits(&self, range: &RangeSpec) -> Result<usize, GitError>;

    /// The commit inside `range` that last modified `path` at `line`
    ///
    /// `None` when the file does not exist at the tip of the range, the line
    /// is past the end of the file, or the line was last changed by a commit
    /// outside the range.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the history cannot be read.
    fn blame(&self, path: &str, line: u32, range: &RangeSpec)
    -> Result<Option<CommitRef>, GitError>;

    /// Commits in `range` whose changes add or remove a line containing
    /// `needle`, newest first
    ///
    /// With a `path`, only changes to that file count. Without one, every
    /// file in the commit is searched.
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the history cannot be read, or if the query
    /// times out or is interrupted.
    fn pickaxe(
        &self,
        needle: &str,
        path: Option<&str>,
        range: &RangeSpec,
    ) -> Result<Vec<CommitRef>, GitError>;

    /// The tracked working-tree file that best matches a partial path
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the index cannot be read.
    fn locate(&self, hint: &str) -> Result<Option<String>, GitError>;

    /// Text of `line` in the working-tree copy of `path`
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the file exists but cannot be read.
    fn line_content(&self, path: &str, line: u32) -> Result<Option<String>, GitError>;
}
