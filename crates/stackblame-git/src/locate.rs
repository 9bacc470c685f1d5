// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Matching partial trace paths against tracked files
//!
//! Traces rarely print repository-relative paths. A Java frame only gives
//! `com/example/Foo.java` (the file lives under `src/main/java/`), while a
//! Python frame gives an absolute path from the machine that crashed
//! (`/srv/app/billing/api.py` for the tracked `billing/api.py`). A tracked
//! path and a hint match when one is a whole-component suffix of the other.

fn components(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

/// Number of trailing components `tracked` and `hint` share, if one is a
/// component-wise suffix of the other
#[must_use]
pub fn match_score(tracked: &str, hint: &str) -> Option<usize> {
    let tracked = components(tracked);
    let hint = components(hint);
    let shared = tracked
        .iter()
        .rev()
        .zip(hint.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    (shared > 0 && shared == tracked.len().min(hint.len())).then_some(shared)
}

/// Pick the tracked path that best matches `hint`
///
/// The match sharing the most trailing components wins; ties go to the
/// lexicographically smallest path so the choice is stable.
pub fn best_match<'a, I>(tracked: I, hint: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    tracked
        .into_iter()
        .filter_map(|path| match_score(path, hint).map(|score| (score, path)))
        .min_by(|(score_a, path_a), (score_b, path_b)| {
            score_b.cmp(score_a).then_with(|| path_a.cmp(path_b))
        })
        .map(|(_, path)| path)
}
