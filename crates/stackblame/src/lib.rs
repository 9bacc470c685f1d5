// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stackblame library
//!
//! This module exports the lookup engine behind the `stackblame` binary for
//! use in integration tests and as a library: range handling, the
//! correlator and ranker, input acquisition and output rendering.

pub mod config;
pub mod correlate;
pub mod error;
pub mod input;
pub mod output;
pub mod range;

pub use correlate::{
    CancelToken, Candidate, Correlator, LookupResults, MatchKind, ScoredResult, lookup,
};
pub use error::{Error, QueryKind, RangeError};
pub use range::RangeResolver;
