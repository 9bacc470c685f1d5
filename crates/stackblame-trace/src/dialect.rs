// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Frame matchers, one per stack trace dialect
//!
//! A matcher looks at a single line and either extracts a frame from it or
//! declines. Matchers carry no state; the parser tries them in a fixed order
//! and the first one that accepts a line wins.

use crate::frame::Dialect;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static JAVA_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    // log4j2 and logback append packaging data: `~[classes/:?]`, `[app.jar:1.0]`
    Regex::new(
        r"^\s*at\s+(?P<symbol>[^\s(]+)\((?P<file>[^():]+):(?P<line>\d+)\)(?:\s*~?\[[^\]]*\])?\s*$",
    )
    .expect("valid java frame regex")
});

static PYTHON_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*File "(?P<file>[^"]+)", line (?P<line>\d+)(?:, in (?P<symbol>.+?))?\s*$"#)
        .expect("valid python frame regex")
});

static RUST_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*at\s+(?P<file>\S+?\.rs):(?P<line>\d+)(?::\d+)?\s*$")
        .expect("valid rust location regex")
});

static RUST_PANIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"panicked at (?:'.*',\s*)?(?P<file>\S+?\.rs):(?P<line>\d+)(?::\d+)?:?\s*$")
        .expect("valid rust panic regex")
});

static RUST_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+:\s+(?:0x[0-9a-fA-F]+ - )?(?P<symbol>\S+?)(?:::h[0-9a-f]{16})?\s*$")
        .expect("valid rust symbol regex")
});

static GO_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?P<file>\S+?\.go):(?P<line>\d+)(?:\s+\+0x[0-9a-fA-F]+)?\s*$")
        .expect("valid go location regex")
});

static GO_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:created by )?(?P<symbol>\S+?)(?:\([^()]*\))?(?: in goroutine \d+)?\s*$")
        .expect("valid go symbol regex")
});

static JS_FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*at\s+(?:(?P<symbol>.+?)\s+\()?(?P<file>[^\s()]+?):(?P<line>\d+):\d+\)?\s*$",
    )
    .expect("valid javascript frame regex")
});

/// Location and symbol extracted from one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMatch {
    /// File path as it should be reported for the frame
    pub file_path: String,
    /// 1-based line number
    pub line_number: u32,
    /// Symbol named on the same line, if any
    pub symbol: Option<String>,
}

/// Recognizes frame lines of one stack trace dialect
pub trait FrameMatcher: Send + Sync {
    /// The dialect this matcher recognizes
    fn dialect(&self) -> Dialect;

    /// Extract a frame from `line`, or `None` if the line is not a frame
    fn match_line(&self, line: &str) -> Option<FrameMatch>;

    /// Symbol printed on the line above a frame, for dialects that split a
    /// frame over two lines
    fn symbol_from_previous(&self, _previous: &str) -> Option<String> {
        None
    }

    /// Whether the dialect prints the offending source line under a frame
    fn source_follows(&self) -> bool {
        false
    }
}

/// Parse a captured line number; 0 and out-of-range values are not frames
fn line_number(caps: &Captures<'_>) -> Option<u32> {
    caps.name("line")?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
}

fn symbol(caps: &Captures<'_>) -> Option<String> {
    caps.name("symbol")
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `at com.example.Foo.bar(Foo.java:12)`, optionally followed by
/// `~[app.jar:1.0]`
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaMatcher;

impl JavaMatcher {
    /// Qualify the bare file name with the package directory of the class
    ///
    /// `com.example.Foo$Inner.run` + `Foo.java` -> `com/example/Foo.java`
    fn qualify(symbol: &str, file: &str) -> String {
        let class = symbol.rsplit_once('.').map_or("", |(class, _method)| class);
        match class.rsplit_once('.') {
            Some((package, _)) if !package.is_empty() => {
                format!("{}/{}", package.replace('.', "/"), file)
            }
            _ => file.to_string(),
        }
    }
}

impl FrameMatcher for JavaMatcher {
    fn dialect(&self) -> Dialect {
        Dialect::Java
    }

    fn match_line(&self, line: &str) -> Option<FrameMatch> {
        let caps = JAVA_FRAME.captures(line)?;
        let raw_symbol = caps.name("symbol")?.as_str();
        // Drop class loader / module prefixes such as `app//` or `java.base@17/`
        let symbol = raw_symbol.rsplit('/').next().unwrap_or(raw_symbol);
        let file = caps.name("file")?.as_str();
        Some(FrameMatch {
            file_path: Self::qualify(symbol, file),
            line_number: line_number(&caps)?,
            symbol: Some(symbol.to_string()),
        })
    }
}

/// `File "app/models.py", line 42, in save`
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonMatcher;

impl FrameMatcher for PythonMatcher {
    fn dialect(&self) -> Dialect {
        Dialect::Python
    }

    fn match_line(&self, line: &str) -> Option<FrameMatch> {
        let caps = PYTHON_FRAME.captures(line)?;
        Some(FrameMatch {
            file_path: caps.name("file")?.as_str().to_string(),
            line_number: line_number(&caps)?,
            symbol: symbol(&caps),
        })
    }

    fn source_follows(&self) -> bool {
        true
    }
}

/// `at ./src/parse.rs:12:9` under `3: app::parse`, and `panicked at src/main.rs:4:5:`
#[derive(Debug, Default, Clone, Copy)]
pub struct RustMatcher;

impl FrameMatcher for RustMatcher {
    fn dialect(&self) -> Dialect {
        Dialect::Rust
    }

    fn match_line(&self, line: &str) -> Option<FrameMatch> {
        let caps = RUST_LOCATION
            .captures(line)
            .or_else(|| RUST_PANIC.captures(line))?;
        let file = caps.name("file")?.as_str();
        Some(FrameMatch {
            file_path: file.strip_prefix("./").unwrap_or(file).to_string(),
            line_number: line_number(&caps)?,
            symbol: None,
        })
    }

    fn symbol_from_previous(&self, previous: &str) -> Option<String> {
        symbol(&RUST_SYMBOL.captures(previous)?)
    }
}

/// `\t/src/app/main.go:42 +0x1d` under `main.(*Server).handle(...)`
#[derive(Debug, Default, Clone, Copy)]
pub struct GoMatcher;

impl FrameMatcher for GoMatcher {
    fn dialect(&self) -> Dialect {
        Dialect::Go
    }

    fn match_line(&self, line: &str) -> Option<FrameMatch> {
        let caps = GO_LOCATION.captures(line)?;
        Some(FrameMatch {
            file_path: caps.name("file")?.as_str().to_string(),
            line_number: line_number(&caps)?,
            symbol: None,
        })
    }

    fn symbol_from_previous(&self, previous: &str) -> Option<String> {
        symbol(&GO_SYMBOL.captures(previous)?)
    }
}

/// `at handler (/srv/app/routes.js:10:5)` and `at /srv/app/routes.js:10:5`
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptMatcher;

impl FrameMatcher for JavaScriptMatcher {
    fn dialect(&self) -> Dialect {
        Dialect::JavaScript
    }

    fn match_line(&self, line: &str) -> Option<FrameMatch> {
        let caps = JS_FRAME.captures(line)?;
        let file = caps.name("file")?.as_str();
        Some(FrameMatch {
            file_path: file.strip_prefix("file://").unwrap_or(file).to_string(),
            line_number: line_number(&caps)?,
            symbol: symbol(&caps),
        })
    }
}

/// The built-in matchers, in the order they are tried
#[must_use]
pub fn builtin_matchers() -> Vec<Box<dyn FrameMatcher>> {
    vec![
        Box::new(JavaMatcher),
        Box::new(PythonMatcher),
        Box::new(RustMatcher),
        Box::new(GoMatcher),
        Box::new(JavaScriptMatcher),
    ]
}
