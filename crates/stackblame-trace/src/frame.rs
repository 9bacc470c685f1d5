// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Stack frame and traceback types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stack trace format a frame was recognized in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// JVM traces (`at pkg.Class.method(File.java:12)`)
    Java,
    /// Python tracebacks (`File "x.py", line 3, in f`)
    Python,
    /// Rust panics and backtraces (`at src/main.rs:10:5`)
    Rust,
    /// Go goroutine dumps (`\t/src/app/main.go:42 +0x1d`)
    Go,
    /// Node.js / V8 traces (`at fn (file.js:10:5)`)
    JavaScript,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Java => "java",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::JavaScript => "javascript",
        };
        f.write_str(name)
    }
}

/// One entry of a stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Path of the source file, possibly relative or only partially qualified
    pub file_path: String,
    /// 1-based line number
    pub line_number: u32,
    /// Function or method active in this frame, if the trace names one
    pub symbol: Option<String>,
    /// Position of the frame within the trace (0 = first frame in the input)
    pub frame_index: usize,
    /// Format the frame was recognized in
    pub dialect: Dialect,
    /// Source text printed by the trace under the frame, if any
    pub source_line: Option<String>,
}

impl StackFrame {
    /// The innermost name of the symbol (`com.example.Foo.bar` -> `bar`)
    #[must_use]
    pub fn short_symbol(&self) -> Option<&str> {
        let symbol = self.symbol.as_deref()?;
        let name = symbol
            .rsplit(|c: char| c == '.' || c == ':' || c == '/')
            .find(|part| !part.is_empty())
            .unwrap_or(symbol);
        Some(name)
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}:{}", self.frame_index, self.file_path, self.line_number)?;
        if let Some(symbol) = &self.symbol {
            write!(f, " in {symbol}")?;
        }
        if let Some(code) = &self.source_line {
            write!(f, "\n      {code}")?;
        }
        Ok(())
    }
}

/// An ordered sequence of frames, in the order they appeared in the input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traceback {
    frames: Vec<StackFrame>,
    context: Vec<String>,
}

impl Traceback {
    pub(crate) fn new(frames: Vec<StackFrame>, context: Vec<String>) -> Self {
        Self { frames, context }
    }

    /// The frames, in input order
    #[must_use]
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Non-frame lines (exception header, messages, `... N more`)
    #[must_use]
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the trace has no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The first context line, usually the exception type and message
    #[must_use]
    pub fn headline(&self) -> Option<&str> {
        self.context.first().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a Traceback {
    type Item = &'a StackFrame;
    type IntoIter = std::slice::Iter<'a, StackFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl fmt::Display for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(headline) = self.headline() {
            writeln!(f, "{headline}")?;
        }
        for frame in &self.frames {
            writeln!(f, "  {frame}")?;
        }
        Ok(())
    }
}
