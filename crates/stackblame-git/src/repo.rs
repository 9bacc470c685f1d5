// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! History queries against a real repository
//!
//! Revision walks, blame, diffs and the index are read through the `git2`
//! crate. Date-bounded ranges go through the `git` executable instead, so
//! that date expressions are understood exactly as `git log --since` would.

use crate::backend::HistoryBackend;
use crate::commit::CommitRef;
use crate::error::GitError;
use crate::locate::{best_match, match_score};
use crate::range::RangeSpec;
use git2::{
    BlameOptions, DiffFormat, DiffOptions, ErrorCode, ObjectType, Oid, Repository, RevparseMode,
    Sort,
};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Commits of a range, newest first, plus the revision the range ends at
struct ResolvedRange {
    tip: Option<Oid>,
    commits: Vec<Oid>,
    members: HashSet<Oid>,
}

impl ResolvedRange {
    fn new(tip: Option<Oid>, commits: Vec<Oid>) -> Self {
        let members = commits.iter().copied().collect();
        let tip = if commits.is_empty() { None } else { tip };
        Self {
            tip,
            commits,
            members,
        }
    }
}

/// A git repository answering history queries
///
/// The backend only remembers where the repository lives; every query opens
/// its own `Repository` handle, so queries from different threads never
/// share libgit2 state.
#[derive(Debug, Clone)]
pub struct GitBackend {
    git_dir: PathBuf,
    workdir: Option<PathBuf>,
    pickaxe_timeout: Option<Duration>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl GitBackend {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repo(&repo))
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_repo(&repo))
    }

    fn from_repo(repo: &Repository) -> Self {
        Self {
            git_dir: repo.path().to_path_buf(),
            workdir: repo.workdir().map(Path::to_path_buf),
            pickaxe_timeout: None,
            interrupt: None,
        }
    }

    /// Give up on a pickaxe search that runs longer than `timeout`
    #[must_use]
    pub fn with_pickaxe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pickaxe_timeout = timeout;
        self
    }

    /// Stop long history scans once `flag` is set
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn repo(&self) -> Result<Repository, GitError> {
        Repository::open(&self.git_dir).map_err(|_| GitError::RepositoryNotFound {
            path: self.git_dir.display().to_string(),
        })
    }

    fn resolve(&self, repo: &Repository, range: &RangeSpec) -> Result<ResolvedRange, GitError> {
        match range {
            RangeSpec::Explicit(spec) => resolve_explicit(repo, spec),
            RangeSpec::Since { date, branch } => self.resolve_since(date, branch.as_deref()),
        }
    }

    /// `git rev-list --since=<date> <branch>`
    fn resolve_since(&self, date: &str, branch: Option<&str>) -> Result<ResolvedRange, GitError> {
        let tip = branch.unwrap_or("HEAD");
        let since = format!("--since={date}");
        let command = format!("git rev-list {since} {tip}");

        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(["rev-list", since.as_str(), tip, "--"])
            .output()
            .map_err(|e| GitError::Command {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("unknown revision") || stderr.contains("bad revision") {
                return Err(GitError::InvalidReference {
                    reference: tip.to_string(),
                });
            }
            return Err(GitError::Command {
                command,
                message: stderr.trim().to_string(),
            });
        }

        let commits = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Oid::from_str(l.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(date, tip, commits = commits.len(), "Resolved date range");
        Ok(ResolvedRange::new(commits.first().copied(), commits))
    }
}

fn resolve_explicit(repo: &Repository, spec: &str) -> Result<ResolvedRange, GitError> {
    let invalid = || GitError::InvalidReference {
        reference: spec.to_string(),
    };
    let peel = |object: Option<&git2::Object<'_>>| -> Result<Oid, GitError> {
        object
            .and_then(|o| o.peel_to_commit().ok())
            .map(|c| c.id())
            .ok_or_else(invalid)
    };

    let revspec = repo.revparse(spec).map_err(|_| invalid())?;
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;

    let tip = if revspec.mode().contains(RevparseMode::SINGLE) {
        let tip = peel(revspec.from())?;
        revwalk.push(tip)?;
        tip
    } else {
        let from = peel(revspec.from())?;
        let to = peel(revspec.to())?;
        revwalk.push(to)?;
        if revspec.mode().contains(RevparseMode::MERGE_BASE) {
            revwalk.push(from)?;
            if let Ok(base) = repo.merge_base(from, to) {
                revwalk.hide(base)?;
            }
        } else {
            revwalk.hide(from)?;
        }
        to
    };

    let commits = revwalk.collect::<Result<Vec<Oid>, _>>()?;
    Ok(ResolvedRange::new(Some(tip), commits))
}

fn line_count(content: &[u8]) -> usize {
    let newlines = content.iter().filter(|b| **b == b'\n').count();
    match content.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Whether the commit's diff against its first parent adds or removes a
/// line containing `needle`, in `path` only when one is given
fn diff_mentions(
    repo: &Repository,
    commit: &git2::Commit<'_>,
    needle: &str,
    path: Option<&str>,
) -> Result<bool, GitError> {
    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut opts = DiffOptions::new();
    opts.context_lines(0);
    if let Some(path) = path {
        opts.pathspec(path).disable_pathspec_match(true);
    }
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    let mut found = false;
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if !found && matches!(line.origin(), '+' | '-') {
            found = std::str::from_utf8(line.content()).is_ok_and(|text| text.contains(needle));
        }
        true
    })?;
    Ok(found)
}

impl HistoryBackend for GitBackend {
    fn count_commits(&self, range: &RangeSpec) -> Result<usize, GitError> {
        let repo = self.repo()?;
        Ok(self.resolve(&repo, range)?.commits.len())
    }

    fn blame(
        &self,
        path: &str,
        line: u32,
        range: &RangeSpec,
    ) -> Result<Option<CommitRef>, GitError> {
        let repo = self.repo()?;
        let resolved = self.resolve(&repo, range)?;
        let Some(tip) = resolved.tip else {
            return Ok(None);
        };

        let tree = repo.find_commit(tip)?.tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!(path, %range, "File not present at range tip");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let line = line as usize;
        if line == 0 || line_count(repo.find_blob(entry.id())?.content()) < line {
            return Ok(None);
        }

        let mut opts = BlameOptions::new();
        opts.newest_commit(tip).min_line(line).max_line(line);
        let blame = repo.blame_file(Path::new(path), Some(&mut opts))?;
        let Some(hunk) = blame.get_line(line) else {
            return Ok(None);
        };

        let oid = hunk.final_commit_id();
        if !resolved.members.contains(&oid) {
            debug!(path, line, commit = %oid, "Last change is outside the range");
            return Ok(None);
        }
        Ok(Some(CommitRef::from_git2(&repo.find_commit(oid)?)))
    }

    fn pickaxe(
        &self,
        needle: &str,
        path: Option<&str>,
        range: &RangeSpec,
    ) -> Result<Vec<CommitRef>, GitError> {
        let repo = self.repo()?;
        let resolved = self.resolve(&repo, range)?;
        let started = Instant::now();
        let query = || match path {
            Some(path) => format!("pickaxe for {needle:?} in {path} ({range})"),
            None => format!("pickaxe for {needle:?} in {range}"),
        };
        let mut hits = Vec::new();

        for oid in &resolved.commits {
            if self.interrupted() {
                return Err(GitError::Interrupted { query: query() });
            }
            if let Some(limit) = self.pickaxe_timeout {
                let elapsed = started.elapsed();
                if elapsed >= limit {
                    return Err(GitError::Timeout {
                        query: query(),
                        elapsed,
                    });
                }
            }

            let commit = repo.find_commit(*oid)?;
            // Like `git log -S`, merges are not searched
            if commit.parent_count() > 1 {
                continue;
            }
            if diff_mentions(&repo, &commit, needle, path)? {
                hits.push(CommitRef::from_git2(&commit));
            }
        }

        debug!(needle, path, %range, hits = hits.len(), "Pickaxe search finished");
        Ok(hits)
    }

    fn locate(&self, hint: &str) -> Result<Option<String>, GitError> {
        let Some(workdir) = self.workdir.as_deref() else {
            return Ok(None);
        };
        let repo = self.repo()?;
        let index = repo.index()?;
        let tracked: Vec<String> = index
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .collect();

        let found = best_match(
            tracked
                .iter()
                .map(String::as_str)
                .filter(|path| match_score(path, hint).is_some())
                .filter(|path| workdir.join(path).is_file()),
            hint,
        )
        .map(str::to_string);
        debug!(hint, found = ?found, "Located trace file");
        Ok(found)
    }

    fn line_content(&self, path: &str, line: u32) -> Result<Option<String>, GitError> {
        let (Some(workdir), Some(index)) = (self.workdir.as_deref(), line.checked_sub(1)) else {
            return Ok(None);
        };
        let content = match std::fs::read(workdir.join(path)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8_lossy(&content);
        Ok(text
            .lines()
            .nth(index as usize)
            .map(str::to_string))
    }
}
