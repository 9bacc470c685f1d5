// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! stackblame: find the commits most likely responsible for a stack trace
//!
//! Reads a stack trace, parses its frames, and ranks the commits in a range
//! by how directly they touched the lines the trace points at.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use stackblame::config::Config;
use stackblame::correlate::{CancelToken, Correlator};
use stackblame::input::read_trace;
use stackblame::output::{Report, render_json, render_text};
use stackblame::range::RangeResolver;
use stackblame_git::GitBackend;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr so results on stdout can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(config.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let range = RangeResolver::from_args(
        config.range.as_deref(),
        config.since.as_deref(),
        config.branch.as_deref(),
    )?;

    let cancel = CancelToken::new();
    let repo_path = config.repo_path();
    let backend = GitBackend::discover(&repo_path)
        .with_context(|| format!("Cannot open a git repository at {}", repo_path.display()))?
        .with_pickaxe_timeout(config.timeout())
        .with_interrupt(cancel.flag());
    debug!(workdir = ?backend.workdir(), "Opened repository");

    RangeResolver::new(&backend).ensure_valid(&range)?;
    info!(%range, "Commit range");

    let input = read_trace(config.input.as_deref())?;
    let trace = stackblame_trace::parse(&input.lines())?;
    info!(source = %input.source, frames = trace.len(), "Parsed stack trace");

    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupted, stopping lookup");
        on_interrupt.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    let results = Correlator::new(&backend)
        .fast(config.fast)
        .jobs(config.jobs)
        .with_cancel(cancel)
        .lookup(&trace, &range)?;

    let report = Report::new(&trace, &range, &results);
    let mut out = io::stdout().lock();
    if config.json {
        render_json(&mut out, &report)?;
    } else {
        render_text(&mut out, &trace, &report)?;
    }
    Ok(())
}
