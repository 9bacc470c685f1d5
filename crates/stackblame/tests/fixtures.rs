// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Shared fixtures for stackblame integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use stackblame_git::MemoryBackend;

/// Noon UTC on the given day of March 2026
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

/// Billing module as it is in the working tree
pub const INVOICE_PY: &str = "\
from billing.lines import amount

def render(lines):
    total = compute(lines)
    return f\"{total:.2f}\"

def compute(lines):
    return sum(amount(l) for l in lines) / len(lines)
";

/// A Python traceback through two lines of `billing/invoice.py`
pub const INVOICE_TRACE: &str = "\
Traceback (most recent call last):
  File \"/srv/app/billing/invoice.py\", line 4, in render
    total = compute(lines)
  File \"/srv/app/billing/invoice.py\", line 8, in compute
    return sum(amount(l) for l in lines) / len(lines)
ZeroDivisionError: division by zero
";

/// History `c0 <- c1 <- c2 <- c3`, one commit per day
///
/// `c1` last touched both lines of `billing/invoice.py` that
/// [`INVOICE_TRACE`] points at; `c2` and `c3` touched other files.
pub fn invoice_history() -> MemoryBackend {
    MemoryBackend::new()
        .with_commit("c0", "Initial import", march(1))
        .with_commit("c1", "Average invoice totals", march(2))
        .with_commit("c2", "Update README", march(3))
        .with_commit("c3", "Bump dependencies", march(4))
        .with_file("billing/invoice.py", INVOICE_PY)
        .with_file("README.md", "# Billing\n")
        .with_blame("billing/invoice.py", 4, "c1")
        .with_blame("billing/invoice.py", 8, "c1")
        .with_blame("billing/invoice.py", 1, "c0")
}
