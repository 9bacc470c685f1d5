// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stackblame-git: history queries for stackblame
//!
//! This library crate answers the questions the correlator asks of a
//! repository: which commits make up a range, who last touched a line
//! (blame), which commits added or removed some text (pickaxe), and which
//! tracked file a partial trace path refers to.
//!
//! All queries go through the [`HistoryBackend`] trait. [`GitBackend`] reads
//! a real repository; [`MemoryBackend`] answers from tables built in tests.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use stackblame_git::{GitBackend, HistoryBackend, RangeSpec};
//!
//! let backend = GitBackend::discover(".").expect("open repo");
//! let range = RangeSpec::explicit("HEAD~10..HEAD");
//!
//! if let Some(commit) = backend.blame("src/lib.rs", 12, &range).expect("blame") {
//!     println!("{} - {}", commit.short_sha(), commit.subject());
//! }
//! ```

pub mod backend;
pub mod commit;
pub mod error;
pub mod locate;
pub mod memory;
pub mod range;
pub mod repo;

pub use backend::HistoryBackend;
pub use commit::CommitRef;
pub use error::GitError;
pub use memory::{MemoryBackend, QueryTally};
pub use range::RangeSpec;
pub use repo::GitBackend;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::HistoryBackend;
    pub use crate::commit::CommitRef;
    pub use crate::error::GitError;
    pub use crate::range::RangeSpec;
    pub use crate::repo::GitBackend;
}
