//! The text merge agent: anchor-aligned three-way line merge.
//!
//! Instead of diffing and transforming patches, both branches are labeled
//! against the common ancestor (see [`crate::merge::align`]), the labeled
//! lines are grouped into anchor-aligned blocks, and each block resolves
//! independently: identical edits collapse, one-sided edits pass through,
//! and genuine divergence renders both variants between conflict markers.
//! In practice this merges cleanly in many places a patch-transform approach
//! would conflict.

use tracing::debug;

use crate::error::RepoError;
use crate::merge::align::align;
use crate::merge::block::assemble_blocks;
use crate::merge::types::{
    ConflictDetails, MergeAgent, MergeConflict, MergeResult, validate_merge_inputs,
};
use crate::model::ids::{ChangeStepId, ConflictId};
use crate::model::text::TextDocument;
use crate::model::version::ArtifactVersion;

/// Category tag on conflict ids allocated by this agent.
const CONFLICT_CATEGORY: &str = "textMerge";

// ---------------------------------------------------------------------------
// TextAgent
// ---------------------------------------------------------------------------

/// Merge agent for `"text"` artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextAgent;

impl TextAgent {
    /// The artifact type tag this agent serves.
    pub const ARTIFACT_TYPE: &'static str = "text";

    /// Decode raw bytes into a text document. Total: malformed UTF-8
    /// degrades to replacement characters rather than failing.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> TextDocument {
        TextDocument::from_bytes(bytes)
    }

    /// Encode a text document back into raw bytes.
    #[must_use]
    pub fn encode(content: &TextDocument) -> Vec<u8> {
        content.to_bytes()
    }
}

impl MergeAgent for TextAgent {
    fn artifact_type(&self) -> &'static str {
        Self::ARTIFACT_TYPE
    }

    fn merge(
        &self,
        change_step: &ChangeStepId,
        ancestor: &ArtifactVersion,
        source: &ArtifactVersion,
        target: &ArtifactVersion,
    ) -> Result<MergeResult, RepoError> {
        validate_merge_inputs(Self::ARTIFACT_TYPE, ancestor, source, target)?;

        let base = Self::decode(ancestor.content()?);
        let source_doc = Self::decode(source.content()?);
        let target_doc = Self::decode(target.content()?);

        let source_labeled = align(base.lines(), source_doc.lines());
        let target_labeled = align(base.lines(), target_doc.lines());
        let blocks = assemble_blocks(source_labeled, target_labeled);
        debug!(
            artifact = %ancestor.artifact_id(),
            blocks = blocks.len(),
            "assembled text merge blocks"
        );

        let mut merged_lines = Vec::new();
        let mut conflicts = Vec::new();
        for block in &blocks {
            if let Some(range) = block.render(source.id(), target.id(), &mut merged_lines) {
                conflicts.push(MergeConflict {
                    id: ConflictId::fresh(CONFLICT_CATEGORY)?,
                    artifact_id: ancestor.artifact_id().clone(),
                    source_version: source.id().clone(),
                    target_version: target.id().clone(),
                    change_step: change_step.clone(),
                    details: ConflictDetails::Text(range),
                });
            }
        }
        if !conflicts.is_empty() {
            debug!(
                artifact = %ancestor.artifact_id(),
                conflicts = conflicts.len(),
                "text merge produced conflicts"
            );
        }

        Ok(MergeResult {
            artifact_type: Self::ARTIFACT_TYPE.to_owned(),
            artifact_id: ancestor.artifact_id().clone(),
            ancestor_version: ancestor.id().clone(),
            source_version: source.id().clone(),
            target_version: target.id().clone(),
            proposed_merge: Self::encode(&TextDocument::from_lines(merged_lines)),
            conflicts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::types::TextConflict;
    use crate::model::ids::ArtifactId;

    fn versions(
        ancestor: &str,
        source: &str,
        target: &str,
    ) -> (ArtifactVersion, ArtifactVersion, ArtifactVersion) {
        let artifact = ArtifactId::fresh();
        let make = |content: &str| {
            ArtifactVersion::new_working(
                artifact.clone(),
                TextAgent::ARTIFACT_TYPE,
                content.as_bytes().to_vec(),
                vec![],
            )
        };
        (make(ancestor), make(source), make(target))
    }

    fn merge(ancestor: &str, source: &str, target: &str) -> MergeResult {
        let (anc, src, tgt) = versions(ancestor, source, target);
        TextAgent
            .merge(&ChangeStepId::fresh(), &anc, &src, &tgt)
            .unwrap()
    }

    fn merged_text(result: &MergeResult) -> String {
        String::from_utf8(result.proposed_merge.clone()).unwrap()
    }

    #[test]
    fn merge_of_identical_versions_is_identity() {
        let text = "a\nb\nc\n";
        let result = merge(text, text, text);
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), text);
    }

    #[test]
    fn source_change_with_unmodified_target_wins() {
        let result = merge("a\nb\nc\n", "a\nX\nc\n", "a\nb\nc\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nX\nc\n");
    }

    #[test]
    fn target_change_with_unmodified_source_wins() {
        let result = merge("a\nb\nc\n", "a\nb\nc\n", "a\nY\nc\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nY\nc\n");
    }

    #[test]
    fn identical_edits_on_both_sides_collapse() {
        let result = merge("a\nb\nc\n", "a\nZ\nc\n", "a\nZ\nc\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nZ\nc\n");
    }

    #[test]
    fn disjoint_edits_merge_cleanly() {
        // Source edits line 2, target edits line 4; edits anchor to
        // different blocks and both land.
        let result = merge("a\nb\nc\nd\ne\n", "a\nB\nc\nd\ne\n", "a\nb\nc\nD\ne\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nB\nc\nD\ne\n");
    }

    #[test]
    fn divergent_edits_produce_one_conflict_with_exact_range() {
        let result = merge("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n");
        assert_eq!(result.conflicts.len(), 1);

        let text = merged_text(&result);
        assert!(text.contains("X\n"));
        assert!(text.contains("Y\n"));

        let ConflictDetails::Text(TextConflict {
            start_line,
            end_line,
        }) = &result.conflicts[0].details
        else {
            panic!("expected text conflict details");
        };
        let output_lines: Vec<&str> = text.split_inclusive('\n').collect();
        assert!(output_lines[*start_line].starts_with("<<<<<<<"));
        assert!(output_lines[*end_line - 1].starts_with(">>>>>>>"));
        // The marker block holds both variants.
        let body = &output_lines[*start_line..*end_line];
        assert!(body.contains(&"X\n"));
        assert!(body.contains(&"Y\n"));
    }

    #[test]
    fn conflict_id_is_category_tagged() {
        let result = merge("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n");
        assert_eq!(result.conflicts[0].id.category(), "textMerge");
    }

    #[test]
    fn conflict_records_carry_version_and_step_ids() {
        let (anc, src, tgt) = versions("a\nb\nc\n", "a\nX\nc\n", "a\nY\nc\n");
        let step = ChangeStepId::fresh();
        let result = TextAgent.merge(&step, &anc, &src, &tgt).unwrap();
        let conflict = &result.conflicts[0];
        assert_eq!(&conflict.source_version, src.id());
        assert_eq!(&conflict.target_version, tgt.id());
        assert_eq!(conflict.change_step, step);
        assert_eq!(&conflict.artifact_id, anc.artifact_id());
    }

    #[test]
    fn one_sided_multi_line_deletion_does_not_resurrect_lines() {
        let result = merge("a\nb\nc\nd\n", "a\nd\n", "a\nb\nc\nd\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nd\n");
    }

    #[test]
    fn multi_line_replacement_merges_cleanly_one_sided() {
        let result = merge("a\nb\nc\nd\n", "a\nX\nY\nd\n", "a\nb\nc\nd\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nX\nY\nd\n");
    }

    #[test]
    fn both_sides_append_same_tail() {
        let result = merge("a\n", "a\ntail\n", "a\ntail\n");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\ntail\n");
    }

    #[test]
    fn empty_ancestor_divergent_content_conflicts() {
        let result = merge("", "from source\n", "from target\n");
        assert_eq!(result.conflicts.len(), 1);
        let text = merged_text(&result);
        assert!(text.contains("from source\n"));
        assert!(text.contains("from target\n"));
    }

    #[test]
    fn unterminated_final_line_survives_merge() {
        let result = merge("a\nend", "a\nend", "a\nend");
        assert!(result.is_clean());
        assert_eq!(merged_text(&result), "a\nend");
    }

    #[test]
    fn result_envelope_identifies_inputs() {
        let (anc, src, tgt) = versions("x\n", "x\n", "x\n");
        let result = TextAgent
            .merge(&ChangeStepId::fresh(), &anc, &src, &tgt)
            .unwrap();
        assert_eq!(result.artifact_type, "text");
        assert_eq!(&result.artifact_id, anc.artifact_id());
        assert_eq!(&result.ancestor_version, anc.id());
        assert_eq!(&result.source_version, src.id());
        assert_eq!(&result.target_version, tgt.id());
    }

    #[test]
    fn mismatched_artifact_ids_are_rejected() {
        let (anc, src, _) = versions("x\n", "x\n", "x\n");
        let other = ArtifactVersion::new_working(
            ArtifactId::fresh(),
            TextAgent::ARTIFACT_TYPE,
            b"x\n".to_vec(),
            vec![],
        );
        let err = TextAgent
            .merge(&ChangeStepId::fresh(), &anc, &src, &other)
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidParameter { .. }));
    }

    #[test]
    fn aborted_input_is_rejected() {
        let (anc, src, mut tgt) = versions("x\n", "x\n", "x\n");
        tgt.abort().unwrap();
        let err = TextAgent
            .merge(&ChangeStepId::fresh(), &anc, &src, &tgt)
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
    }

    #[test]
    fn merge_does_not_mutate_inputs() {
        let (anc, src, tgt) = versions("a\nb\n", "a\nX\n", "a\nY\n");
        let (anc2, src2, tgt2) = (anc.clone(), src.clone(), tgt.clone());
        let _ = TextAgent
            .merge(&ChangeStepId::fresh(), &anc, &src, &tgt)
            .unwrap();
        assert_eq!(anc, anc2);
        assert_eq!(src, src2);
        assert_eq!(tgt, tgt2);
    }
}
