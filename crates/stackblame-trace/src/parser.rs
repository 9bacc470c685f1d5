// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stack trace parsing
//!
//! Turns raw trace text into a [`Traceback`]. Each line is offered to the
//! frame matchers in priority order; lines no matcher accepts are kept as
//! context (exception headers, `Caused by:`, `... 12 more`).
//!
//! # Example
//!
//! ```
//! use stackblame_trace::parse_str;
//!
//! let trace = parse_str(
//!     "java.lang.IllegalStateException: boom\n\
//!      \tat com.example.Foo.bar(Foo.java:12)\n\
//!      \tat com.example.Main.main(Main.java:5)\n",
//! )
//! .unwrap();
//! assert_eq!(trace.len(), 2);
//! assert_eq!(trace.frames()[0].file_path, "com/example/Foo.java");
//! ```

use crate::dialect::{FrameMatch, FrameMatcher, builtin_matchers};
use crate::error::TraceError;
use crate::frame::{StackFrame, Traceback};
use tracing::debug;

/// Parser holding an ordered set of frame matchers
pub struct TraceParser {
    matchers: Vec<Box<dyn FrameMatcher>>,
}

impl Default for TraceParser {
    fn default() -> Self {
        Self {
            matchers: builtin_matchers(),
        }
    }
}

impl TraceParser {
    /// Create a parser with the built-in dialects
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with no matchers at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Append a matcher; it is tried after all existing ones
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl FrameMatcher + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    fn match_line(&self, line: &str) -> Option<(&dyn FrameMatcher, FrameMatch)> {
        self.matchers
            .iter()
            .find_map(|m| m.match_line(line).map(|found| (m.as_ref(), found)))
    }

    /// Parse trace lines into a traceback
    ///
    /// Elements of `lines` may themselves contain line breaks (for example
    /// when they come straight from `read_line`); they are split first.
    ///
    /// # Errors
    ///
    /// Returns `TraceError::NoFrames` if the input has non-blank lines but
    /// none of them is a recognizable frame. Blank input parses to an empty
    /// traceback.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<Traceback, TraceError> {
        let lines: Vec<&str> = lines
            .iter()
            .flat_map(|l| l.as_ref().lines())
            .map(str::trim_end)
            .collect();

        let mut frames: Vec<StackFrame> = Vec::new();
        let mut context: Vec<String> = Vec::new();
        let mut non_blank = 0usize;
        let mut previous_is_context = false;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() {
                previous_is_context = false;
                i += 1;
                continue;
            }
            non_blank += 1;

            let Some((matcher, found)) = self.match_line(line) else {
                context.push(line.trim().to_string());
                previous_is_context = true;
                i += 1;
                continue;
            };

            let mut symbol = found.symbol;
            if symbol.is_none() && previous_is_context && i > 0 {
                symbol = matcher.symbol_from_previous(lines[i - 1]);
                if symbol.is_some() {
                    // The line belongs to this frame, not to the message
                    context.pop();
                }
            }

            let mut source_line = None;
            if matcher.source_follows() {
                if let Some(next) = lines.get(i + 1) {
                    let indented = next.starts_with(char::is_whitespace);
                    if indented && !next.trim().is_empty() && self.match_line(next).is_none() {
                        source_line = Some(next.trim().to_string());
                        non_blank += 1;
                        i += 1;
                    }
                }
            }

            frames.push(StackFrame {
                file_path: found.file_path,
                line_number: found.line_number,
                symbol,
                frame_index: frames.len(),
                dialect: matcher.dialect(),
                source_line,
            });
            previous_is_context = false;
            i += 1;
        }

        if frames.is_empty() && non_blank > 0 {
            return Err(TraceError::NoFrames { lines: non_blank });
        }

        debug!(
            frames = frames.len(),
            context_lines = context.len(),
            "Parsed stack trace"
        );
        Ok(Traceback::new(frames, context))
    }
}

/// Parse trace lines with the built-in dialects
///
/// # Errors
///
/// See [`TraceParser::parse`].
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Traceback, TraceError> {
    TraceParser::default().parse(lines)
}

/// Parse a whole trace held in one string
///
/// # Errors
///
/// See [`TraceParser::parse`].
pub fn parse_str(text: &str) -> Result<Traceback, TraceError> {
    parse(&[text])
}
