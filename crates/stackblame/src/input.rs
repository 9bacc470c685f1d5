// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Reading the trace text
//!
//! An explicit `--input` file wins. Otherwise standard input is read when it
//! is piped, and the system clipboard is used when standard input is a
//! terminal.

use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Clipboard readers, tried in order until one succeeds
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbpaste", &[]),
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
    ("powershell", &["-NoProfile", "-Command", "Get-Clipboard"]),
];

/// Where the trace was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file given with `--input`
    File(PathBuf),
    /// Piped standard input
    Stdin,
    /// The clipboard, via the named command
    Clipboard(&'static str),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("stdin"),
            Self::Clipboard(command) => write!(f, "clipboard ({command})"),
        }
    }
}

/// Input errors
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file could not be read
    #[error("Failed to read {path}: {source}")]
    File {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Standard input could not be read
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    /// No clipboard command worked
    #[error(
        "No stack trace on stdin and no clipboard tool found. \
         Pipe the trace in or use --input FILE"
    )]
    NoClipboard,

    /// The input held nothing but whitespace
    #[error("Received empty input from {0}")]
    Empty(InputSource),
}

/// A trace read from one of the input sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceInput {
    /// Raw trace text
    pub text: String,
    /// Where it came from
    pub source: InputSource,
}

impl TraceInput {
    /// The trace split into lines
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }

    fn checked(text: String, source: InputSource) -> Result<Self, InputError> {
        if text.trim().is_empty() {
            return Err(InputError::Empty(source));
        }
        debug!(%source, lines = text.lines().count(), "Read trace");
        Ok(Self { text, source })
    }
}

/// Read the trace from `path`, piped stdin, or the clipboard
///
/// # Errors
///
/// Returns `InputError` if the chosen source cannot be read or is empty.
pub fn read_trace(path: Option<&Path>) -> Result<TraceInput, InputError> {
    if let Some(path) = path {
        return read_file(path);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        debug!("stdin is a terminal, trying the clipboard");
        return read_clipboard();
    }
    read_from(stdin.lock(), InputSource::Stdin)
}

/// Read the trace from a file
///
/// # Errors
///
/// Returns `InputError::File` if the file cannot be read, or
/// `InputError::Empty` if it is blank.
pub fn read_file(path: &Path) -> Result<TraceInput, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::File {
        path: path.to_path_buf(),
        source,
    })?;
    TraceInput::checked(text, InputSource::File(path.to_path_buf()))
}

/// Read the whole trace from `reader`
///
/// # Errors
///
/// Returns `InputError::Stdin` on a read failure, or `InputError::Empty` if
/// the text is blank.
pub fn read_from(mut reader: impl Read, source: InputSource) -> Result<TraceInput, InputError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(InputError::Stdin)?;
    TraceInput::checked(text, source)
}

fn read_clipboard() -> Result<TraceInput, InputError> {
    for (program, args) in CLIPBOARD_COMMANDS {
        match Command::new(program).args(*args).output() {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).into_owned();
                return TraceInput::checked(text, InputSource::Clipboard(program));
            }
            Ok(output) => debug!(program, status = %output.status, "Clipboard command failed"),
            Err(e) => debug!(program, error = %e, "Clipboard command not available"),
        }
    }
    Err(InputError::NoClipboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_read_from_reader() {
        let input = read_from(
            "Exception in thread \"main\"\n\tat a.B.c(B.java:3)\n".as_bytes(),
            InputSource::Stdin,
        )
        .unwrap();
        assert_eq!(input.source, InputSource::Stdin);
        assert_eq!(input.lines(), vec!["Exception in thread \"main\"", "\tat a.B.c(B.java:3)"]);
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let err = read_from(" \n\t\n".as_bytes(), InputSource::Stdin).unwrap_err();
        assert!(matches!(err, InputError::Empty(InputSource::Stdin)));
        assert_eq!(err.to_string(), "Received empty input from stdin");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(Path::new("/nonexistent/trace.txt")).unwrap_err();
        assert!(matches!(err, InputError::File { .. }));
    }

    #[test]
    fn test_read_file() {
        let path = std::env::temp_dir().join(format!("stackblame-input-{}.txt", std::process::id()));
        fs::write(&path, "  File \"a.py\", line 1, in f\n").unwrap();
        let input = read_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(input.source, InputSource::File(path));
        assert_eq!(input.lines().len(), 1);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(InputSource::Stdin.to_string(), "stdin");
        assert_eq!(InputSource::Clipboard("pbpaste").to_string(), "clipboard (pbpaste)");
    }
}
