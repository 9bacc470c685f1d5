// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for stackblame-trace

use thiserror::Error;

/// Errors that can occur while parsing a stack trace
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// The input had content but no line looked like a stack frame
    #[error("No stack frames found in {lines} line(s) of input")]
    NoFrames {
        /// Number of non-blank lines that were examined
        lines: usize,
    },
}
