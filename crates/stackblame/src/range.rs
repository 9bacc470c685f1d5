// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Turning user arguments into a checked commit range
//!
//! # Example
//!
//! ```
//! use stackblame::range::RangeResolver;
//! use stackblame_git::RangeSpec;
//!
//! let range = RangeResolver::from_args(None, Some("2 weeks ago"), Some("main")).unwrap();
//! assert_eq!(range, RangeSpec::since("2 weeks ago", Some("main")));
//! ```

use stackblame_git::{HistoryBackend, RangeSpec};
use tracing::debug;

use crate::error::{Error, RangeError};

fn present(arg: Option<&str>) -> Option<&str> {
    arg.map(str::trim).filter(|s| !s.is_empty())
}

/// Builds and checks [`RangeSpec`]s against a history backend
pub struct RangeResolver<'a> {
    backend: &'a dyn HistoryBackend,
}

impl<'a> RangeResolver<'a> {
    /// Create a resolver that checks ranges against `backend`
    pub fn new(backend: &'a dyn HistoryBackend) -> Self {
        Self { backend }
    }

    /// Whether `range` contains at least one commit
    ///
    /// An unknown reference or malformed range is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::BackendUnavailable` if the history cannot be read.
    pub fn validate(&self, range: &RangeSpec) -> Result<bool, Error> {
        match self.backend.count_commits(range) {
            Ok(count) => {
                debug!(%range, count, "Validated commit range");
                Ok(count > 0)
            }
            Err(e) if e.is_invalid_reference() => {
                debug!(%range, error = %e, "Commit range does not resolve");
                Ok(false)
            }
            Err(source) => Err(Error::BackendUnavailable {
                range: range.clone(),
                source,
            }),
        }
    }

    /// [`validate`](Self::validate), treating an empty range as an error
    ///
    /// # Errors
    ///
    /// Returns `RangeError::Empty` if the range has no commits, or
    /// `Error::BackendUnavailable` if the history cannot be read.
    pub fn ensure_valid(&self, range: &RangeSpec) -> Result<(), Error> {
        if self.validate(range)? {
            Ok(())
        } else {
            Err(RangeError::Empty {
                range: range.clone(),
            }
            .into())
        }
    }

    /// Pick the range from the command-line arguments
    ///
    /// Blank strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns `RangeError` if both or neither of `range` and `since` are
    /// given, or if `branch` is given without `since`.
    pub fn from_args(
        range: Option<&str>,
        since: Option<&str>,
        branch: Option<&str>,
    ) -> Result<RangeSpec, RangeError> {
        match (present(range), present(since), present(branch)) {
            (Some(_), Some(_), _) => Err(RangeError::Conflicting),
            (Some(_), None, Some(_)) => Err(RangeError::BranchWithoutSince),
            (Some(range), None, None) => Ok(RangeSpec::explicit(range)),
            (None, Some(since), branch) => Ok(Self::resolve_since(since, branch)),
            (None, None, Some(_)) => Err(RangeError::BranchWithoutSince),
            (None, None, None) => Err(RangeError::Missing),
        }
    }

    /// A date-bounded range on `branch` (or `HEAD`)
    ///
    /// The date expression is not interpreted here; git's own date parser
    /// reads it when the range is resolved.
    #[must_use]
    pub fn resolve_since(date_spec: &str, branch: Option<&str>) -> RangeSpec {
        RangeSpec::since(date_spec, present(branch))
    }
}
