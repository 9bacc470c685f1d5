// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Correlating stack frames with commits
//!
//! Every frame of a trace is looked up in the history twice: blame asks which
//! commit last touched the frame's line, pickaxe asks which commits added or
//! removed the frame's code. Hits from all frames are merged per commit and
//! ranked.
//!
//! # Scoring
//!
//! A commit earns [`BLAME_WEIGHT`] for each frame it is the blame hit of and
//! [`PICKAXE_WEIGHT`] for each frame it is a pickaxe hit of. A frame counts
//! once per kind, however many times the same commit is reported for it.
//! Results are ordered by score, then newest author date, then SHA.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use stackblame::correlate::Correlator;
//! use stackblame_git::{MemoryBackend, RangeSpec};
//!
//! let backend = MemoryBackend::new()
//!     .with_commit("c1", "Add checkout", Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap())
//!     .with_commit("c2", "Divide by item count", Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap())
//!     .with_file("shop/checkout.py", "def total(items):\n    return sum(items) / len(items)\n")
//!     .with_blame("shop/checkout.py", 2, "c2");
//!
//! let trace = stackblame_trace::parse_str(
//!     "Traceback (most recent call last):\n  File \"/srv/shop/checkout.py\", line 2, in total\n",
//! )
//! .unwrap();
//!
//! let results = Correlator::new(&backend)
//!     .lookup(&trace, &RangeSpec::explicit("c1..c2"))
//!     .unwrap();
//! assert_eq!(results.sorted()[0].commit.sha, "c2");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use stackblame_git::{CommitRef, GitError, HistoryBackend, RangeSpec};
use stackblame_trace::{StackFrame, Traceback};
use tracing::{debug, info};

use crate::error::{Error, QueryKind};
use crate::range::RangeResolver;

/// Score for being the last commit to touch a frame's line
pub const BLAME_WEIGHT: u32 = 3;

/// Score for adding or removing a frame's code
pub const PICKAXE_WEIGHT: u32 = 1;

/// Default number of frames queried at once
pub const DEFAULT_JOBS: usize = 4;

/// Pickaxe needles shorter than this match too much history to be useful
const MIN_NEEDLE_LEN: usize = 3;

/// Minimum length of a bare symbol name used as a pickaxe needle
const MIN_SYMBOL_LEN: usize = 6;

/// Runtime and standard library namespaces; their symbol names are not
/// searched for in project history
const RUNTIME_PREFIXES: &[&str] = &[
    "java.", "javax.", "jdk.", "sun.", "com.sun.", "kotlin.", "scala.", "std::", "core::",
    "alloc::", "runtime.", "node:", "internal/",
];

/// How a commit was tied to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Last modifier of the frame's line
    Blame,
    /// Added or removed the frame's code
    Pickaxe,
}

impl MatchKind {
    /// Score contributed by one match of this kind
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Self::Blame => BLAME_WEIGHT,
            Self::Pickaxe => PICKAXE_WEIGHT,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blame => "blame",
            Self::Pickaxe => "pickaxe",
        })
    }
}

/// One query hit for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The commit the query returned
    pub commit: CommitRef,
    /// Frame the query was made for
    pub frame_index: usize,
    /// Query that produced the hit
    pub match_kind: MatchKind,
    /// Score contribution
    pub weight: u32,
}

impl Candidate {
    /// A hit weighted by its kind
    #[must_use]
    pub fn new(commit: CommitRef, frame_index: usize, match_kind: MatchKind) -> Self {
        Self {
            commit,
            frame_index,
            match_kind,
            weight: match_kind.weight(),
        }
    }
}

/// A frame that contributed to a result's score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FrameMatch {
    /// Index of the frame in the trace
    pub frame_index: usize,
    /// How the commit matched it
    pub kind: MatchKind,
}

/// A commit with its accumulated evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredResult {
    /// The suspect commit
    pub commit: CommitRef,
    /// Sum of the weights of all distinct matches
    pub total_score: u32,
    /// Frames with at least one match
    pub contributing_frames: BTreeSet<usize>,
    /// Every distinct (frame, kind) match, in frame order
    pub matches: Vec<FrameMatch>,
}

impl ScoredResult {
    fn new(commit: CommitRef) -> Self {
        Self {
            commit,
            total_score: 0,
            contributing_frames: BTreeSet::new(),
            matches: Vec::new(),
        }
    }

    /// Count a match unless the same frame already matched the same way
    fn add(&mut self, frame_index: usize, kind: MatchKind, weight: u32) {
        let hit = FrameMatch { frame_index, kind };
        if self.matches.contains(&hit) {
            return;
        }
        self.total_score += weight;
        self.contributing_frames.insert(frame_index);
        self.matches.push(hit);
        self.matches.sort_unstable();
    }
}

/// Ranked lookup results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LookupResults {
    results: Vec<ScoredResult>,
}

impl LookupResults {
    /// Results in final order, best first
    #[must_use]
    pub fn sorted(&self) -> &[ScoredResult] {
        &self.results
    }

    /// No commit matched any frame
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of distinct commits
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Take ownership of the ranked results
    #[must_use]
    pub fn into_vec(self) -> Vec<ScoredResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a LookupResults {
    type Item = &'a ScoredResult;
    type IntoIter = std::slice::Iter<'a, ScoredResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Merge candidates per commit and rank them
///
/// The result does not depend on the order of `candidates`.
pub fn rank(candidates: impl IntoIterator<Item = Candidate>) -> LookupResults {
    let mut by_sha: BTreeMap<String, ScoredResult> = BTreeMap::new();
    for candidate in candidates {
        by_sha
            .entry(candidate.commit.sha.clone())
            .or_insert_with(|| ScoredResult::new(candidate.commit))
            .add(candidate.frame_index, candidate.match_kind, candidate.weight);
    }

    let mut results: Vec<ScoredResult> = by_sha.into_values().collect();
    results.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| b.commit.timestamp.cmp(&a.commit.timestamp))
            .then_with(|| a.commit.sha.cmp(&b.commit.sha))
    });
    LookupResults { results }
}

/// Shared flag for interrupting a running lookup
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every lookup holding this token to stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// The underlying flag, for backends that poll it during long scans
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Looks up traces against one history backend
pub struct Correlator<'a> {
    backend: &'a dyn HistoryBackend,
    fast: bool,
    jobs: usize,
    cancel: CancelToken,
}

impl<'a> Correlator<'a> {
    /// A correlator with fast mode off and [`DEFAULT_JOBS`] workers
    pub fn new(backend: &'a dyn HistoryBackend) -> Self {
        Self {
            backend,
            fast: false,
            jobs: DEFAULT_JOBS,
            cancel: CancelToken::new(),
        }
    }

    /// Skip pickaxe for frames whose file is not in the working tree
    #[must_use]
    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    /// Number of frames queried at once
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Stop early when `token` is cancelled
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Rank the commits in `range` by how strongly they relate to `trace`
    ///
    /// The range is checked first; frame queries only run against a range
    /// with commits in it. Finding nothing is an empty result, not an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Range` if the range is empty, `Error::Cancelled` if
    /// the token was cancelled, or the first query error.
    pub fn lookup(&self, trace: &Traceback, range: &RangeSpec) -> Result<LookupResults, Error> {
        self.check_cancelled()?;
        RangeResolver::new(self.backend).ensure_valid(range)?;
        if trace.is_empty() {
            return Ok(LookupResults::default());
        }

        info!(frames = trace.len(), %range, fast = self.fast, jobs = self.jobs, "Querying history");
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("stackblame-query-{i}"))
            .build()
            .map_err(|source| Error::WorkerPool {
                jobs: self.jobs,
                source,
            })?;

        let per_frame: Vec<Vec<Candidate>> = pool.install(|| {
            trace
                .frames()
                .par_iter()
                .map(|frame| self.query_frame(frame, range))
                .collect::<Result<Vec<_>, Error>>()
        })?;
        self.check_cancelled()?;

        let results = rank(per_frame.into_iter().flatten());
        info!(commits = results.len(), "Ranked candidate commits");
        Ok(results)
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn query_frame(&self, frame: &StackFrame, range: &RangeSpec) -> Result<Vec<Candidate>, Error> {
        let fail = move |kind: QueryKind, path: &str| {
            let path = path.to_string();
            move |source: GitError| match source {
                GitError::Interrupted { .. } => Error::Cancelled,
                source => Error::Query {
                    frame: frame.frame_index,
                    kind,
                    path,
                    range: range.clone(),
                    source,
                },
            }
        };
        let mut candidates = Vec::new();

        self.check_cancelled()?;
        let located = self
            .backend
            .locate(&frame.file_path)
            .map_err(fail(QueryKind::Locate, &frame.file_path))?;

        match located.as_deref() {
            Some(path) => {
                self.check_cancelled()?;
                let blamed = self
                    .backend
                    .blame(path, frame.line_number, range)
                    .map_err(fail(QueryKind::Blame, path))?;
                debug!(frame = frame.frame_index, path, line = frame.line_number, commit = ?blamed.as_ref().map(CommitRef::short_sha), "Blame");
                candidates.extend(
                    blamed.map(|c| Candidate::new(c, frame.frame_index, MatchKind::Blame)),
                );
            }
            None if self.fast => {
                debug!(frame = frame.frame_index, file = %frame.file_path, "Not in working tree, skipping pickaxe");
                return Ok(candidates);
            }
            None => {
                debug!(frame = frame.frame_index, file = %frame.file_path, "Not in working tree");
            }
        }

        let Some(needle) = self.needle(frame, located.as_deref(), range)? else {
            debug!(frame = frame.frame_index, "No usable pickaxe needle");
            return Ok(candidates);
        };
        self.check_cancelled()?;
        let hits = self
            .backend
            .pickaxe(&needle, located.as_deref(), range)
            .map_err(fail(
                QueryKind::Pickaxe,
                located.as_deref().unwrap_or(frame.file_path.as_str()),
            ))?;
        debug!(frame = frame.frame_index, needle, hits = hits.len(), "Pickaxe");
        candidates.extend(
            hits.into_iter()
                .map(|c| Candidate::new(c, frame.frame_index, MatchKind::Pickaxe)),
        );
        Ok(candidates)
    }

    /// Text to search history for: the code the trace printed, else the
    /// working-tree line, else the symbol name
    fn needle(
        &self,
        frame: &StackFrame,
        located: Option<&str>,
        range: &RangeSpec,
    ) -> Result<Option<String>, Error> {
        if let Some(code) = frame.source_line.as_deref().and_then(usable_code) {
            return Ok(Some(code));
        }
        if let Some(path) = located {
            self.check_cancelled()?;
            let line = self
                .backend
                .line_content(path, frame.line_number)
                .map_err(|source| Error::Query {
                    frame: frame.frame_index,
                    kind: QueryKind::LineContent,
                    path: path.to_string(),
                    range: range.clone(),
                    source,
                })?;
            if let Some(code) = line.as_deref().and_then(usable_code) {
                return Ok(Some(code));
            }
        }
        Ok(symbol_needle(frame))
    }
}

fn usable_code(text: &str) -> Option<String> {
    let text = text.trim();
    (text.chars().count() >= MIN_NEEDLE_LEN).then(|| text.to_string())
}

/// The frame's short symbol name, if it is a project identifier long enough
/// to be distinctive
///
/// `<module>` and `<anonymous>` are not code. Names like `run` or `get`, and
/// anything in a runtime namespace, would match most of the history.
fn symbol_needle(frame: &StackFrame) -> Option<String> {
    let symbol = frame.symbol.as_deref()?;
    if RUNTIME_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix)) {
        return None;
    }
    let name = frame.short_symbol()?;
    let is_ident = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    (is_ident && name.chars().count() >= MIN_SYMBOL_LEN).then(|| name.to_string())
}

/// Look up `trace` in `range` with default settings
///
/// # Errors
///
/// See [`Correlator::lookup`].
pub fn lookup(
    backend: &dyn HistoryBackend,
    trace: &Traceback,
    range: &RangeSpec,
    fast: bool,
) -> Result<LookupResults, Error> {
    Correlator::new(backend).fast(fast).lookup(trace, range)
}
