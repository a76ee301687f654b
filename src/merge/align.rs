//! Line alignment: label a modified line sequence against a base sequence.
//!
//! The alignment computes a longest common subsequence over line content,
//! then labels every line of both sequences: lines in the LCS are
//! `Unmodified`, base-only lines are `Deleted`, modified-only lines are
//! `Inserted`. Each labeled line carries an *anchor* — a position in the
//! base sequence — which later decides which merge block the line joins:
//!
//! - a deleted line anchors at its own base index + 1, the same position
//!   its unmodified counterpart gets on the other branch — a deletion and
//!   the untouched copy of the deleted line must land in the same merge
//!   block, or one-sided deletions would not merge cleanly;
//! - each LCS match anchors at its own base index + 1;
//! - a run of inserted lines anchors at the base index of the next LCS
//!   match, or at `base.len()` after the last match — a ten-line file has
//!   an eleventh anchor index meaning "after the end".
//!
//! Anchors are non-decreasing in emission order, which gives merge-block
//! assembly a total order to work with.

// ---------------------------------------------------------------------------
// LineLabel / LabeledLine
// ---------------------------------------------------------------------------

/// How a line relates to the base sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineLabel {
    /// Present in the base, absent from the modified sequence.
    Deleted,
    /// Present in the modified sequence, absent from the base.
    Inserted,
    /// Present in both (part of the LCS).
    Unmodified,
}

/// A line labeled with how it differs from the base version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledLine {
    /// The line's relation to the base.
    pub label: LineLabel,
    /// The line content, terminator included.
    pub content: String,
    /// Index in the base sequence, when the line exists there.
    pub base_line: Option<usize>,
    /// Index in the modified sequence, when the line exists there.
    pub modified_line: Option<usize>,
    /// Base-sequence position this line is anchored to.
    pub anchor: usize,
}

impl LabeledLine {
    /// Returns `true` if this line survives into the modified sequence.
    #[must_use]
    pub const fn survives(&self) -> bool {
        matches!(self.label, LineLabel::Inserted | LineLabel::Unmodified)
    }

    /// Returns `true` if this line represents an actual edit (not an
    /// unmodified pass-through).
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        !matches!(self.label, LineLabel::Unmodified)
    }
}

/// Check whether two labeled lines describe the equivalent edit: deleting
/// the same line, inserting the same text at the same position, or leaving
/// the same text unmodified.
#[must_use]
pub fn lines_match(first: &LabeledLine, second: &LabeledLine) -> bool {
    first.label == second.label
        && first.base_line == second.base_line
        && first.anchor == second.anchor
        && first.content == second.content
}

// ---------------------------------------------------------------------------
// LCS
// ---------------------------------------------------------------------------

/// Matched index pairs `(base, modified)` of a longest common subsequence,
/// by content equality. Deterministic: ties prefer advancing the base side.
fn lcs_pairs(base: &[String], modified: &[String]) -> Vec<(usize, usize)> {
    let n = base.len();
    let m = modified.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    // lengths[i][j] = LCS length of base[i..] vs modified[j..]
    let mut lengths = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if base[i] == modified[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(lengths[0][0]);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if base[i] == modified[j] {
            pairs.push((i, j));
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    pairs
}

// ---------------------------------------------------------------------------
// align
// ---------------------------------------------------------------------------

/// Label `modified` against `base`, producing the full labeled line stream
/// for both sequences in anchor order.
#[must_use]
pub fn align(base: &[String], modified: &[String]) -> Vec<LabeledLine> {
    let pairs = lcs_pairs(base, modified);
    let mut out = Vec::with_capacity(base.len() + modified.len());

    let mut next_base = 0;
    let mut next_modified = 0;
    for &(base_idx, modified_idx) in &pairs {
        // Base lines skipped before this match were deleted, each anchored
        // at its own position; modified lines skipped were inserted,
        // anchored at the match's base index.
        for line in next_base..base_idx {
            out.push(LabeledLine {
                label: LineLabel::Deleted,
                content: base[line].clone(),
                base_line: Some(line),
                modified_line: None,
                anchor: line + 1,
            });
        }
        for line in next_modified..modified_idx {
            out.push(LabeledLine {
                label: LineLabel::Inserted,
                content: modified[line].clone(),
                base_line: None,
                modified_line: Some(line),
                anchor: base_idx,
            });
        }
        out.push(LabeledLine {
            label: LineLabel::Unmodified,
            content: base[base_idx].clone(),
            base_line: Some(base_idx),
            modified_line: Some(modified_idx),
            anchor: base_idx + 1,
        });
        next_base = base_idx + 1;
        next_modified = modified_idx + 1;
    }

    // Trailing lines follow the same rules; insertions anchor past the end.
    for line in next_base..base.len() {
        out.push(LabeledLine {
            label: LineLabel::Deleted,
            content: base[line].clone(),
            base_line: Some(line),
            modified_line: None,
            anchor: line + 1,
        });
    }
    for line in next_modified..modified.len() {
        out.push(LabeledLine {
            label: LineLabel::Inserted,
            content: modified[line].clone(),
            base_line: None,
            modified_line: Some(line),
            anchor: base.len(),
        });
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
