// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stackblame-trace: Stack trace parsing for stackblame
//!
//! This library crate turns stack trace text from several runtimes (JVM,
//! Python, Rust, Go, Node.js) into an ordered list of frames that the
//! stackblame correlator can look up in git history.
//!
//! # Example
//!
//! ```
//! use stackblame_trace::{Dialect, parse_str};
//!
//! let trace = parse_str(
//!     "Traceback (most recent call last):\n  \
//!        File \"app/jobs.py\", line 8, in compute\n    \
//!          return total / count\n\
//!      ZeroDivisionError: division by zero\n",
//! )
//! .unwrap();
//!
//! let frame = &trace.frames()[0];
//! assert_eq!(frame.dialect, Dialect::Python);
//! assert_eq!(frame.source_line.as_deref(), Some("return total / count"));
//! ```

#![warn(missing_docs)]

pub mod dialect;
pub mod error;
pub mod frame;
pub mod parser;

pub use dialect::{FrameMatch, FrameMatcher};
pub use error::TraceError;
pub use frame::{Dialect, StackFrame, Traceback};
pub use parser::{TraceParser, parse, parse_str};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::TraceError;
    pub use crate::frame::{Dialect, StackFrame, Traceback};
    pub use crate::parser::{TraceParser, parse, parse_str};
}
