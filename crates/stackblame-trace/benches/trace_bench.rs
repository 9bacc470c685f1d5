// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stackblame_trace::parse;

/// A Java trace with `depth` frames and a cause section every 50 frames
fn java_trace(depth: usize) -> Vec<String> {
    let mut lines = vec!["java.lang.IllegalStateException: benchmark".to_string()];
    for i in 0..depth {
        if i > 0 && i % 50 == 0 {
            lines.push(format!("Caused by: java.io.IOException: layer {i}"));
        }
        lines.push(format!(
            "\tat org.bench.layer{}.Handler{}.handle(Handler{}.java:{})",
            i % 7,
            i,
            i,
            i + 1
        ));
    }
    lines
}

/// A Python traceback with `depth` frames, each followed by its source line
fn python_trace(depth: usize) -> Vec<String> {
    let mut lines = vec!["Traceback (most recent call last):".to_string()];
    for i in 0..depth {
        lines.push(format!(
            "  File \"/srv/bench/mod{}.py\", line {}, in step_{}",
            i % 11,
            i + 1,
            i
        ));
        lines.push(format!("    value = step_{}(value)", i + 1));
    }
    lines.push("RuntimeError: benchmark".to_string());
    lines
}

fn parse_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for depth in [10, 100, 1000] {
        let java = java_trace(depth);
        group.bench_with_input(BenchmarkId::new("java", depth), &java, |b, lines| {
            b.iter(|| parse(lines).expect("parse java"))
        });

        let python = python_trace(depth);
        group.bench_with_input(BenchmarkId::new("python", depth), &python, |b, lines| {
            b.iter(|| parse(lines).expect("parse python"))
        });
    }

    group.finish();
}

criterion_group!(benches, parse_benchmarks);
criterion_main!(benches);
