//! Line diffs for `convert --diff`.
//!
//! Not a minimal diff: after a mismatch the nearest pair of equal lines
//! within [`RESYNC_WINDOW`] re-synchronizes the two sides. Conversions only
//! insert lines near the constructor and replace expressions in place, which
//! this handles well.

use std::fmt::Write as _;
use std::ops::Range;

/// Unchanged lines shown around each change.
const CONTEXT: usize = 2;

/// How far ahead (in combined lines) to look for a re-synchronization point.
const RESYNC_WINDOW: usize = 200;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DiffLine<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

impl DiffLine<'_> {
    fn is_change(self) -> bool {
        !matches!(self, DiffLine::Same(_))
    }

    fn in_old(self) -> bool {
        !matches!(self, DiffLine::Added(_))
    }

    fn in_new(self) -> bool {
        !matches!(self, DiffLine::Removed(_))
    }
}

/// Render a unified diff of `original` against `converted`.
///
/// Empty when the two texts have the same lines.
pub fn render_diff(path: &str, original: &str, converted: &str) -> String {
    let old: Vec<&str> = original.lines().collect();
    let new: Vec<&str> = converted.lines().collect();
    let lines = diff_lines(&old, &new);

    let mut output = String::new();
    let ranges = hunks(&lines);
    if ranges.is_empty() {
        return output;
    }

    let _ = writeln!(output, "--- {path}");
    let _ = writeln!(output, "+++ {path}");
    for hunk in ranges {
        write_hunk(&mut output, &lines, hunk);
    }
    output
}

fn diff_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffLine<'a>> {
    let mut lines = Vec::with_capacity(old.len().max(new.len()));
    let (mut i, mut j) = (0, 0);
    while i < old.len() || j < new.len() {
        if i < old.len() && j < new.len() && old[i] == new[j] {
            lines.push(DiffLine::Same(old[i]));
            i += 1;
            j += 1;
            continue;
        }
        let (removed, added) = resync(old, new, i, j);
        lines.extend(old[i..i + removed].iter().map(|&l| DiffLine::Removed(l)));
        lines.extend(new[j..j + added].iter().map(|&l| DiffLine::Added(l)));
        i += removed;
        j += added;
    }
    lines
}

/// Smallest `(a, b)` by `a + b` with `old[i + a] == new[j + b]`, or the rest
/// of both sides when there is none in reach.
fn resync(old: &[&str], new: &[&str], i: usize, j: usize) -> (usize, usize) {
    for distance in 1..=RESYNC_WINDOW {
        for a in 0..=distance {
            let b = distance - a;
            if let (Some(o), Some(n)) = (old.get(i + a), new.get(j + b)) {
                if o == n {
                    return (a, b);
                }
            }
        }
    }
    (old.len() - i, new.len() - j)
}

/// Ranges of `lines` to print, changes merged when their context touches.
fn hunks(lines: &[DiffLine<'_>]) -> Vec<Range<usize>> {
    let mut changes = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.is_change())
        .map(|(k, _)| k)
        .peekable();

    let mut hunks = Vec::new();
    while let Some(first) = changes.next() {
        let mut last = first;
        while let Some(next) = changes.next_if(|&k| k <= last + 2 * CONTEXT + 1) {
            last = next;
        }
        hunks.push(first.saturating_sub(CONTEXT)..(last + CONTEXT + 1).min(lines.len()));
    }
    hunks
}

fn write_hunk(output: &mut String, lines: &[DiffLine<'_>], hunk: Range<usize>) {
    let before = &lines[..hunk.start];
    let body = &lines[hunk.clone()];
    let old_start = before.iter().filter(|l| l.in_old()).count() + 1;
    let new_start = before.iter().filter(|l| l.in_new()).count() + 1;
    let old_len = body.iter().filter(|l| l.in_old()).count();
    let new_len = body.iter().filter(|l| l.in_new()).count();

    let _ = writeln!(output, "@@ -{old_start},{old_len} +{new_start},{new_len} @@");
    for line in body {
        let _ = match line {
            DiffLine::Same(text) => writeln!(output, " {text}"),
            DiffLine::Removed(text) => writeln!(output, "-{text}"),
            DiffLine::Added(text) => writeln!(output, "+{text}"),
        };
    }
}
