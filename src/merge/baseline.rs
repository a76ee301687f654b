//! The baseline merge agent: three-way merge of snapshot manifests.
//!
//! Every artifact id appearing in any of the three baselines is classified
//! against the ancestor in each branch — added, removed, modified, or
//! unmodified — and resolved through a single decision table:
//!
//! | ancestor | source       | target       | outcome                        |
//! |----------|--------------|--------------|--------------------------------|
//! | present  | removed      | removed      | dropped                        |
//! | present  | removed      | unmodified   | dropped                        |
//! | present  | unmodified   | removed      | dropped                        |
//! | present  | modified     | removed      | `DEL_MOD` conflict, dropped    |
//! | present  | removed      | modified     | `MOD_DEL` conflict, dropped    |
//! | present  | modified = v | modified = v | v                              |
//! | present  | modified     | modified ≠   | `MOD_MOD` conflict, omitted    |
//! | present  | modified     | unmodified   | source's version               |
//! | present  | unmodified   | modified     | target's version               |
//! | present  | unmodified   | unmodified   | source's version               |
//! | absent   | added = v    | added = v    | v                              |
//! | absent   | added       | added ≠      | `MOD_MOD` conflict, omitted    |
//! | absent   | added        | absent       | source's version               |
//! | absent   | absent       | added        | target's version               |
//!
//! The merged mapping never resolves two different versions silently: any
//! divergent pair yields exactly one `MOD_MOD` conflict and the id is left
//! out of the proposal pending manual resolution.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::RepoError;
use crate::merge::types::{
    BaselineConflict, BaselineConflictKind, ConflictDetails, MergeAgent, MergeConflict,
    MergeResult, validate_merge_inputs,
};
use crate::model::baseline::Baseline;
use crate::model::ids::{ArtifactId, ChangeStepId, ConflictId};
use crate::model::version::ArtifactVersion;

/// Category tag on conflict ids allocated by this agent.
const CONFLICT_CATEGORY: &str = "baselineMerge";

// ---------------------------------------------------------------------------
// BaselineAgent
// ---------------------------------------------------------------------------

/// Merge agent for `"baseline"` artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaselineAgent;

impl BaselineAgent {
    /// The artifact type tag this agent serves.
    pub const ARTIFACT_TYPE: &'static str = "baseline";

    /// Decode a baseline from its wire encoding.
    ///
    /// # Errors
    /// Fails with `InvalidParameter` on malformed JSON.
    pub fn decode(bytes: &[u8]) -> Result<Baseline, RepoError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode a baseline into its wire form.
    ///
    /// # Errors
    /// Fails with `Internal` if serialization fails (it cannot for valid
    /// baselines).
    pub fn encode(content: &Baseline) -> Result<Vec<u8>, RepoError> {
        serde_json::to_vec(content)
            .map_err(|e| RepoError::internal(format!("baseline encoding failed: {e}")))
    }
}

impl MergeAgent for BaselineAgent {
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

        let ancestor_bl = Self::decode(ancestor.content()?)?;
        let source_bl = Self::decode(source.content()?)?;
        let target_bl = Self::decode(target.content()?)?;

        let all_ids: BTreeSet<ArtifactId> = ancestor_bl
            .iter()
            .chain(source_bl.iter())
            .chain(target_bl.iter())
            .map(|(id, _)| id.clone())
            .collect();

        // The target's root carries over, matching its precedence elsewhere.
        let mut merged = Baseline::new(target_bl.root_dir().clone());
        let mut conflict_details: Vec<BaselineConflict> = Vec::new();

        for id in &all_ids {
            let anc = ancestor_bl.get(id);
            let src = source_bl.get(id);
            let tgt = target_bl.get(id);

            let keep = match (anc, src, tgt) {
                // Gone from both branches, however it got there.
                (Some(_), None, None) => None,

                // Removed in target. A concurrent source modification is a
                // conflict; a plain source removal or no source change drops
                // the entry silently.
                (Some(anc_v), Some(src_v), None) => {
                    if src_v == anc_v {
                        None
                    } else {
                        conflict_details.push(BaselineConflict {
                            kind: BaselineConflictKind::DelMod,
                            source_version: Some(src_v.clone()),
                            target_version: None,
                        });
                        None
                    }
                }

                // Removed in source, mirror image.
                (Some(anc_v), None, Some(tgt_v)) => {
                    if tgt_v == anc_v {
                        None
                    } else {
                        conflict_details.push(BaselineConflict {
                            kind: BaselineConflictKind::ModDel,
                            source_version: None,
                            target_version: Some(tgt_v.clone()),
                        });
                        None
                    }
                }

                // Present everywhere: compare modifications per branch.
                (Some(anc_v), Some(src_v), Some(tgt_v)) => {
                    let src_modified = src_v != anc_v;
                    let tgt_modified = tgt_v != anc_v;
                    match (src_modified, tgt_modified) {
                        (true, true) if src_v == tgt_v => Some(src_v.clone()),
                        (true, true) => {
                            conflict_details.push(BaselineConflict {
                                kind: BaselineConflictKind::ModMod,
                                source_version: Some(src_v.clone()),
                                target_version: Some(tgt_v.clone()),
                            });
                            None
                        }
                        (true, false) => Some(src_v.clone()),
                        (false, true) => Some(tgt_v.clone()),
                        // Untouched by target: source takes precedence (the
                        // versions are equal anyway).
                        (false, false) => Some(src_v.clone()),
                    }
                }

                // Added in both branches.
                (None, Some(src_v), Some(tgt_v)) => {
                    if src_v == tgt_v {
                        Some(src_v.clone())
                    } else {
                        conflict_details.push(BaselineConflict {
                            kind: BaselineConflictKind::ModMod,
                            source_version: Some(src_v.clone()),
                            target_version: Some(tgt_v.clone()),
                        });
                        None
                    }
                }

                // Added in exactly one branch.
                (None, Some(src_v), None) => Some(src_v.clone()),
                (None, None, Some(tgt_v)) => Some(tgt_v.clone()),

                // Unreachable: every id came from one of the three maps.
                (None, None, None) => None,
            };

            if let Some(version) = keep {
                merged.add(id.clone(), version)?;
            }
        }
        debug!(
            artifact = %ancestor.artifact_id(),
            entries = merged.len(),
            conflicts = conflict_details.len(),
            "merged baseline"
        );

        let conflicts = conflict_details
            .into_iter()
            .map(|details| {
                Ok(MergeConflict {
                    id: ConflictId::fresh(CONFLICT_CATEGORY)?,
                    artifact_id: ancestor.artifact_id().clone(),
                    source_version: source.id().clone(),
                    target_version: target.id().clone(),
                    change_step: change_step.clone(),
                    details: ConflictDetails::Baseline(details),
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;

        Ok(MergeResult {
            artifact_type: Self::ARTIFACT_TYPE.to_owned(),
            artifact_id: ancestor.artifact_id().clone(),
            ancestor_version: ancestor.id().clone(),
            source_version: source.id().clone(),
            target_version: target.id().clone(),
            proposed_merge: Self::encode(&merged)?,
            conflicts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
