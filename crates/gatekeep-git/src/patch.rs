//! Line-level hunk computation and best-effort application.
//!
//! Uses the `similar` crate (Myers diff) to describe how one tree's file
//! content becomes another's, and applies those hunks to a third content
//! that may have drifted. A hunk applies only where its original lines
//! still match; everything else is dropped, favoring the developer's edits
//! over the automated rewrite.

use similar::{capture_diff_slices, Algorithm, DiffTag};
use tracing::debug;

/// How far (in lines) a hunk may shift from its expected position and
/// still apply.
const MAX_DRIFT: usize = 10;

/// A contiguous block of changed lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk {
    /// Line index (0-based) in the old content where `old_lines` begin.
    pub old_start: usize,
    /// The lines this hunk replaces. Empty for a pure insertion.
    pub old_lines: Vec<String>,
    /// The replacement lines. Empty for a pure deletion.
    pub new_lines: Vec<String>,
}

/// Outcome of a best-effort application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Hunks spliced into the target.
    pub applied: usize,
    /// Hunks dropped because their original lines no longer match.
    pub dropped: usize,
}

/// Compute the hunks transforming `old` into `new`.
pub fn compute_hunks(old: &str, new: &str) -> Vec<Hunk> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines)
        .into_iter()
        .filter(|op| op.tag() != DiffTag::Equal)
        .map(|op| Hunk {
            old_start: op.old_range().start,
            old_lines: old_lines[op.old_range()]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            new_lines: new_lines[op.new_range()]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
        .collect()
}

/// Apply `hunks` to `base`, dropping any hunk whose original lines cannot
/// be found near their expected position.
///
/// The trailing-newline state of `base` is preserved.
pub fn apply_hunks_best_effort(base: &str, hunks: &[Hunk]) -> (String, ApplyReport) {
    let mut lines: Vec<String> = base.lines().map(str::to_string).collect();
    let mut report = ApplyReport::default();
    // Running difference between positions in the original old content and
    // the partially patched target.
    let mut offset: isize = 0;

    for hunk in hunks {
        let expected = hunk.old_start as isize + offset;
        match locate(&lines, &hunk.old_lines, expected) {
            Some(at) => {
                lines.splice(at..at + hunk.old_lines.len(), hunk.new_lines.iter().cloned());
                offset += hunk.new_lines.len() as isize - hunk.old_lines.len() as isize;
                report.applied += 1;
            }
            None => {
                debug!(
                    old_start = hunk.old_start,
                    "dropping conflicting hunk; keeping local content"
                );
                report.dropped += 1;
            }
        }
    }

    let mut result = lines.join("\n");
    if !result.is_empty() && (base.ends_with('\n') || base.is_empty()) {
        result.push('\n');
    }
    (result, report)
}

/// Find where `old_lines` matches in `target`, starting at `expected` and
/// scanning up to [`MAX_DRIFT`] lines in both directions.
fn locate(target: &[String], old_lines: &[String], expected: isize) -> Option<usize> {
    if old_lines.is_empty() {
        // Pure insertion: anchor at the expected position if it is still
        // inside the target.
        let at = usize::try_from(expected).ok()?;
        return (at <= target.len()).then_some(at);
    }

    let matches_at = |at: isize| -> bool {
        let Ok(at) = usize::try_from(at) else {
            return false;
        };
        at + old_lines.len() <= target.len() && target[at..at + old_lines.len()] == *old_lines
    };

    if matches_at(expected) {
        return Some(expected as usize);
    }
    for drift in 1..=MAX_DRIFT as isize {
        if matches_at(expected - drift) {
            return Some((expected - drift) as usize);
        }
        if matches_at(expected + drift) {
            return Some((expected + drift) as usize);
        }
    }
    None
}
