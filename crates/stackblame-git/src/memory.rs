// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! In-memory history for tests
//!
//! [`MemoryBackend`] models a linear history with hand-written blame and
//! pickaxe answers, and counts every query it receives so tests can check
//! which queries the correlator issued.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use stackblame_git::{HistoryBackend, MemoryBackend, RangeSpec};
//!
//! let backend = MemoryBackend::new()
//!     .with_commit("c1", "add cart", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
//!     .with_commit("c2", "fix cart", Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap())
//!     .with_file("src/cart.rs", "fn add() {}\n")
//!     .with_blame("src/cart.rs", 1, "c2");
//!
//! let hit = backend.blame("src/cart.rs", 1, &RangeSpec::explicit("c1..c2")).unwrap();
//! assert_eq!(hit.unwrap().sha, "c2");
//! assert_eq!(backend.queries().blame, 1);
//! ```

use crate::backend::HistoryBackend;
use crate::commit::CommitRef;
use crate::error::GitError;
use crate::locate::best_match;
use crate::range::RangeSpec;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of queries of each kind a backend has answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryTally {
    /// `count_commits` calls
    pub count_commits: usize,
    /// `blame` calls
    pub blame: usize,
    /// `pickaxe` calls
    pub pickaxe: usize,
    /// `locate` calls
    pub locate: usize,
    /// `line_content` calls
    pub line_content: usize,
}

#[derive(Debug, Default)]
struct QueryCounts {
    count_commits: AtomicUsize,
    blame: AtomicUsize,
    pickaxe: AtomicUsize,
    locate: AtomicUsize,
    line_content: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// A linear, in-memory commit history
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Oldest first; each commit's parent is the one before it
    commits: Vec<CommitRef>,
    blame: HashMap<(String, u32), String>,
    /// Needle to (path, sha); a `None` path matches any path filter
    pickaxe: HashMap<String, Vec<(Option<String>, String)>>,
    files: BTreeMap<String, Vec<String>>,
    unavailable: bool,
    counts: QueryCounts,
}

impl MemoryBackend {
    /// An empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit on top of the current history
    #[must_use]
    pub fn with_commit(mut self, sha: &str, message: &str, timestamp: DateTime<Utc>) -> Self {
        let parents = self
            .commits
            .last()
            .map(|c| vec![c.sha.clone()])
            .unwrap_or_default();
        self.commits.push(CommitRef {
            sha: sha.to_string(),
            message: message.to_string(),
            author: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp,
            parents,
        });
        self
    }

    /// Put a file in the working tree
    #[must_use]
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(
            path.to_string(),
            content.lines().map(str::to_string).collect(),
        );
        self
    }

    /// Record `sha` as the last commit to modify `path` at `line`
    #[must_use]
    pub fn with_blame(mut self, path: &str, line: u32, sha: &str) -> Self {
        self.blame.insert((path.to_string(), line), sha.to_string());
        self
    }

    /// Record `sha` as adding or removing text containing `needle`
    ///
    /// The change is not tied to a file, so it is found whatever path the
    /// search is limited to.
    #[must_use]
    pub fn with_pickaxe(mut self, needle: &str, sha: &str) -> Self {
        self.pickaxe
            .entry(needle.to_string())
            .or_default()
            .push((None, sha.to_string()));
        self
    }

    /// Record `sha` as adding or removing text containing `needle` in `path`
    #[must_use]
    pub fn with_pickaxe_in(mut self, path: &str, needle: &str, sha: &str) -> Self {
        self.pickaxe
            .entry(needle.to_string())
            .or_default()
            .push((Some(path.to_string()), sha.to_string()));
        self
    }

    /// Make every query fail as if the repository were gone
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Queries answered so far
    #[must_use]
    pub fn queries(&self) -> QueryTally {
        QueryTally {
            count_commits: self.counts.count_commits.load(Ordering::SeqCst),
            blame: self.counts.blame.load(Ordering::SeqCst),
            pickaxe: self.counts.pickaxe.load(Ordering::SeqCst),
            locate: self.counts.locate.load(Ordering::SeqCst),
            line_content: self.counts.line_content.load(Ordering::SeqCst),
        }
    }

    fn check_available(&self) -> Result<(), GitError> {
        if self.unavailable {
            return Err(GitError::RepositoryNotFound {
                path: "<memory>".to_string(),
            });
        }
        Ok(())
    }

    /// Index of a commit named by `HEAD`, `HEAD~N`, a SHA or a SHA prefix
    fn position(&self, reference: &str) -> Result<usize, GitError> {
        let invalid = || GitError::InvalidReference {
            reference: reference.to_string(),
        };
        let head = self.commits.len().checked_sub(1).ok_or_else(invalid)?;

        if reference == "HEAD" {
            return Ok(head);
        }
        if let Some(back) = reference.strip_prefix("HEAD~") {
            let back: usize = back.parse().map_err(|_| invalid())?;
            return head.checked_sub(back).ok_or_else(invalid);
        }
        self.commits
            .iter()
            .position(|c| c.sha == reference)
            .or_else(|| {
                (reference.len() >= 4)
                    .then(|| self.commits.iter().position(|c| c.sha.starts_with(reference)))
                    .flatten()
            })
            .ok_or_else(invalid)
    }

    /// Commits in `range`, newest first
    fn resolve(&self, range: &RangeSpec) -> Result<Vec<&CommitRef>, GitError> {
        let (start, end) = match range {
            RangeSpec::Explicit(spec) => {
                match spec.split_once("...").or_else(|| spec.split_once("..")) {
                    Some((from, _)) => {
                        let from = self.position(if from.is_empty() { "HEAD" } else { from })?;
                        (from + 1, self.position(range.tip())?)
                    }
                    None => (0, self.position(spec)?),
                }
            }
            RangeSpec::Since { .. } => (0, self.position(range.tip())?),
        };

        let cutoff = match range {
            RangeSpec::Since { date, .. } => Some(parse_date(date).ok_or_else(|| {
                GitError::InvalidReference {
                    reference: date.clone(),
                }
            })?),
            RangeSpec::Explicit(_) => None,
        };

        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end]
            .iter()
            .rev()
            .filter(|c| cutoff.is_none_or(|cutoff| c.timestamp >= cutoff))
            .collect())
    }
}

/// RFC 3339 timestamps or plain `YYYY-MM-DD` dates
fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}

impl HistoryBackend for MemoryBackend {
    fn count_commits(&self, range: &RangeSpec) -> Result<usize, GitError> {
        bump(&self.counts.count_commits);
        self.check_available()?;
        Ok(self.resolve(range)?.len())
    }

    fn blame(
        &self,
        path: &str,
        line: u32,
        range: &RangeSpec,
    ) -> Result<Option<CommitRef>, GitError> {
        bump(&self.counts.blame);
        self.check_available()?;
        let Some(sha) = self.blame.get(&(path.to_string(), line)) else {
            return Ok(None);
        };
        Ok(self
            .resolve(range)?
            .into_iter()
            .find(|c| &c.sha == sha)
            .cloned())
    }

    fn pickaxe(
        &self,
        needle: &str,
        path: Option<&str>,
        range: &RangeSpec,
    ) -> Result<Vec<CommitRef>, GitError> {
        bump(&self.counts.pickaxe);
        self.check_available()?;
        let Some(changes) = self.pickaxe.get(needle) else {
            return Ok(Vec::new());
        };
        let in_scope = |sha: &str| {
            changes.iter().any(|(changed, hit)| {
                hit == sha
                    && match (changed.as_deref(), path) {
                        (Some(changed), Some(path)) => changed == path,
                        _ => true,
                    }
            })
        };
        Ok(self
            .resolve(range)?
            .into_iter()
            .filter(|c| in_scope(&c.sha))
            .cloned()
            .collect())
    }

    fn locate(&self, hint: &str) -> Result<Option<String>, GitError> {
        bump(&self.counts.locate);
        self.check_available()?;
        Ok(best_match(self.files.keys().map(String::as_str), hint).map(str::to_string))
    }

    fn line_content(&self, path: &str, line: u32) -> Result<Option<String>, GitError> {
        bump(&self.counts.line_content);
        self.check_available()?;
        let index = (line as usize).checked_sub(1);
        Ok(self
            .files
            .get(path)
            .zip(index)
            .and_then(|(lines, i)| lines.get(i).cloned()))
    }
}
