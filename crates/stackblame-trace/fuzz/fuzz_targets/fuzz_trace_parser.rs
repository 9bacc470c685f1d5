// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the stack trace parser
//!
//! Any text must either parse or fail with `NoFrames`, and every parsed
//! frame must carry a positive line number and a contiguous index.

#![no_main]

use libfuzzer_sys::fuzz_target;

use stackblame_trace::parse_str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(trace) = parse_str(input) {
            for (i, frame) in trace.frames().iter().enumerate() {
                assert!(frame.line_number >= 1);
                assert_eq!(frame.frame_index, i);
            }
        }
    }
});
