//! Merge blocks: anchor-aligned groups of labeled lines from two branches.
//!
//! Labeled lines from the source and target alignments are grouped by their
//! anchor; one block exists per distinct anchor, and blocks render in
//! ascending anchor order — the output order of the merged document. A block
//! resolves one of four ways: both sides made the same edit, only one side
//! edited, or the sides genuinely diverge and the block renders both
//! variants between conflict markers.

use std::collections::BTreeMap;

use crate::merge::align::{LabeledLine, lines_match};
use crate::merge::types::TextConflict;
use crate::model::ids::VersionId;

// ---------------------------------------------------------------------------
// MergeBlock
// ---------------------------------------------------------------------------

/// The labeled lines from both branches sharing one anchor.
#[derive(Clone, Debug, Default)]
pub struct MergeBlock {
    /// The base-sequence position this block is anchored to.
    pub anchor: usize,
    /// Source-branch lines at this anchor, in alignment order.
    pub source_lines: Vec<LabeledLine>,
    /// Target-branch lines at this anchor, in alignment order.
    pub target_lines: Vec<LabeledLine>,
}

impl MergeBlock {
    fn new(anchor: usize) -> Self {
        Self {
            anchor,
            ..Self::default()
        }
    }

    /// Do the two sides describe the identical edit, line for line?
    fn edits_match(&self) -> bool {
        self.source_lines.len() == self.target_lines.len()
            && self
                .source_lines
                .iter()
                .zip(&self.target_lines)
                .all(|(s, t)| lines_match(s, t))
    }

    /// Is `lines` entirely unmodified (no edit on that side)?
    fn side_unmodified(lines: &[LabeledLine]) -> bool {
        lines.iter().all(|l| !l.is_edit())
    }

    /// Append the lines of `side` that survive into the merged document.
    fn emit_surviving(side: &[LabeledLine], out: &mut Vec<String>) {
        for line in side {
            if line.survives() {
                out.push(line.content.clone());
            }
        }
    }

    /// Render this block into `out`.
    ///
    /// Clean resolutions append lines and return `None`. A divergent block
    /// appends both variants between conflict markers and returns the
    /// `[start, end)` output line range exactly bounding the marker block.
    pub fn render(
        &self,
        source_version: &VersionId,
        target_version: &VersionId,
        out: &mut Vec<String>,
    ) -> Option<TextConflict> {
        if self.edits_match() {
            // Same edit on both sides: emit once.
            Self::emit_surviving(&self.source_lines, out);
            None
        } else if Self::side_unmodified(&self.target_lines) {
            // Only the source changed here; it wins.
            Self::emit_surviving(&self.source_lines, out);
            None
        } else if Self::side_unmodified(&self.source_lines) {
            Self::emit_surviving(&self.target_lines, out);
            None
        } else {
            let start_line = out.len();
            out.push(format!("<<<<<<< source version {source_version}\n"));
            Self::emit_surviving(&self.source_lines, out);
            out.push(format!("======= target version {target_version}\n"));
            Self::emit_surviving(&self.target_lines, out);
            out.push(">>>>>>>\n".to_owned());
            Some(TextConflict {
                start_line,
                end_line: out.len(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Block assembly
// ---------------------------------------------------------------------------

/// Group the two alignments' labeled lines into blocks by anchor, returning
/// the blocks in ascending anchor order.
#[must_use]
pub fn assemble_blocks(
    source_lines: Vec<LabeledLine>,
    target_lines: Vec<LabeledLine>,
) -> Vec<MergeBlock> {
    let mut by_anchor: BTreeMap<usize, MergeBlock> = BTreeMap::new();

    for line in source_lines {
        by_anchor
            .entry(line.anchor)
            .or_insert_with(|| MergeBlock::new(line.anchor))
            .source_lines
            .push(line);
    }
    for line in target_lines {
        by_anchor
            .entry(line.anchor)
            .or_insert_with(|| MergeBlock::new(line.anchor))
            .target_lines
            .push(line);
    }

    by_anchor.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
