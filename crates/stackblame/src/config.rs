// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command-line configuration
//!
//! Every option can also come from the environment, so a wrapper script or
//! CI job can pin the repository, worker count and timeout once.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::correlate::DEFAULT_JOBS;

/// Find the commits most likely responsible for a stack trace
///
/// Reads a stack trace from --input, from standard input when piped, or
/// from the clipboard, and ranks the commits in RANGE (or since --since)
/// that touched the lines it mentions.
#[derive(Parser, Debug, Clone)]
#[command(name = "stackblame")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Commit range to search, in git syntax (e.g. v1.2..HEAD)
    #[arg(value_name = "RANGE")]
    pub range: Option<String>,

    /// Search commits newer than DATE instead of an explicit range
    ///
    /// Any date git understands works: "2 weeks ago", "2026-01-31",
    /// "yesterday".
    #[arg(long, value_name = "DATE", conflicts_with = "range")]
    pub since: Option<String>,

    /// Branch to search with --since (defaults to HEAD)
    #[arg(short, long, value_name = "BRANCH", requires = "since")]
    pub branch: Option<String>,

    /// Skip the pickaxe search for files missing from the working tree
    #[arg(short, long, default_value = "false")]
    pub fast: bool,

    /// Repository to search; discovered upwards from this path
    #[arg(short = 'C', long, value_name = "PATH", env = "STACKBLAME_REPO")]
    pub repo: Option<PathBuf>,

    /// Number of frames queried in parallel
    #[arg(short, long, value_name = "N", env = "STACKBLAME_JOBS", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Give up on a pickaxe search after SECS seconds
    #[arg(long, value_name = "SECS", env = "STACKBLAME_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Read the trace from FILE instead of stdin or the clipboard
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, visible_alias = "debug", default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            range: None,
            since: None,
            branch: None,
            fast: false,
            repo: None,
            jobs: DEFAULT_JOBS,
            timeout: None,
            input: None,
            json: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Get the repository path, using the current directory as default
    #[must_use]
    pub fn repo_path(&self) -> PathBuf {
        self.repo.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// The pickaxe time limit, if one was set
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path is specified but doesn't exist or isn't a directory
    /// - The input file is specified but doesn't exist
    /// - The worker count is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref repo) = self.repo {
            if !repo.exists() {
                return Err(ConfigError::RepoNotFound(repo.clone()));
            }
            if !repo.is_dir() {
                return Err(ConfigError::RepoNotDirectory(repo.clone()));
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
        }

        if self.jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Worker count of zero
    #[error("--jobs must be at least 1")]
    ZeroJobs,
}
