//! The directory merge agent: structural three-way merge of name bindings.
//!
//! Changes are keyed by artifact identity, not by name, so a rename on one
//! branch and an untouched binding on the other merge cleanly. The proposed
//! result is seeded from the target directory; source-side changes are
//! cross-checked against target-side changes for the same artifact and
//! either applied, dropped as already-reflected, or recorded as conflicts
//! (with the target's state preserved pending manual resolution).

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::RepoError;
use crate::merge::types::{
    ConflictDetails, DirectoryConflict, DirectoryConflictKind, MergeAgent, MergeConflict,
    MergeResult, validate_merge_inputs,
};
use crate::model::directory::{Directory, DirectoryChange};
use crate::model::ids::{ArtifactId, ChangeStepId, ConflictId};
use crate::model::version::ArtifactVersion;

/// Category tag on conflict ids allocated by this agent.
const CONFLICT_CATEGORY: &str = "dirMerge";

// ---------------------------------------------------------------------------
// Change computation
// ---------------------------------------------------------------------------

/// The identity-keyed view of a directory: artifact → bound name.
///
/// The directory itself is the name → artifact direction; together they form
/// the dual index the change computation works over.
fn index_by_artifact(dir: &Directory) -> BTreeMap<ArtifactId, String> {
    dir.entries()
        .iter()
        .map(|e| (e.artifact.clone(), e.name.clone()))
        .collect()
}

/// Classify every artifact present in `base` or `modified` as added,
/// removed, or renamed; unchanged bindings are skipped. Output is ordered
/// by artifact id for determinism.
fn directory_changes(
    base: &BTreeMap<ArtifactId, String>,
    modified: &BTreeMap<ArtifactId, String>,
) -> Vec<DirectoryChange> {
    let all_ids: BTreeSet<&ArtifactId> = base.keys().chain(modified.keys()).collect();

    let mut changes = Vec::new();
    for id in all_ids {
        match (base.get(id).map(String::as_str), modified.get(id).map(String::as_str)) {
            (None, Some(name)) => changes.push(DirectoryChange::Add {
                artifact: id.clone(),
                name: name.to_owned(),
            }),
            (Some(name), None) => changes.push(DirectoryChange::Remove {
                artifact: id.clone(),
                name_before: name.to_owned(),
            }),
            (Some(before), Some(after)) if before != after => {
                changes.push(DirectoryChange::Rename {
                    artifact: id.clone(),
                    name_before: before.to_owned(),
                    name_after: after.to_owned(),
                });
            }
            _ => {} // unchanged
        }
    }
    changes
}

// ---------------------------------------------------------------------------
// DirectoryAgent
// ---------------------------------------------------------------------------

/// Merge agent for `"directory"` artifacts.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectoryAgent;

impl DirectoryAgent {
    /// The artifact type tag this agent serves.
    pub const ARTIFACT_TYPE: &'static str = "directory";

    /// Decode a directory from its wire encoding, validating that no name
    /// is bound twice.
    ///
    /// # Errors
    /// Fails with `InvalidParameter` on malformed JSON or duplicate names.
    pub fn decode(bytes: &[u8]) -> Result<Directory, RepoError> {
        let dir: Directory = serde_json::from_slice(bytes)?;
        dir.check_name_uniqueness()?;
        Ok(dir)
    }

    /// Encode a directory into its wire form.
    ///
    /// # Errors
    /// Fails with `Internal` if serialization fails (it cannot for valid
    /// directories).
    pub fn encode(content: &Directory) -> Result<Vec<u8>, RepoError> {
        serde_json::to_vec(content)
            .map_err(|e| RepoError::internal(format!("directory encoding failed: {e}")))
    }

    /// Build the conflict record for a pair of incompatible changes to the
    /// same artifact.
    fn classify_pair(
        in_source: &DirectoryChange,
        in_target: &DirectoryChange,
    ) -> Option<DirectoryConflict> {
        use DirectoryChange::{Add, Remove, Rename};
        match (in_source, in_target) {
            // Both sides added the same artifact under different names.
            (Add { name: src_name, .. }, Add { name: tgt_name, .. }) => Some(DirectoryConflict {
                kind: DirectoryConflictKind::AddAdd,
                name_before: None,
                name_in_source: Some(src_name.clone()),
                name_in_target: Some(tgt_name.clone()),
                referenced_artifact: Some(in_source.artifact_id().clone()),
            }),
            // Source dropped a binding the target renamed.
            (
                Remove { name_before, .. },
                Rename {
                    name_after: tgt_name,
                    ..
                },
            ) => Some(DirectoryConflict {
                kind: DirectoryConflictKind::DelMod,
                name_before: Some(name_before.clone()),
                name_in_source: None,
                name_in_target: Some(tgt_name.clone()),
                referenced_artifact: Some(in_source.artifact_id().clone()),
            }),
            // Source renamed a binding the target dropped.
            (
                Rename {
                    name_before,
                    name_after: src_name,
                    ..
                },
                Remove { .. },
            ) => Some(DirectoryConflict {
                kind: DirectoryConflictKind::DelMod,
                name_before: Some(name_before.clone()),
                name_in_source: Some(src_name.clone()),
                name_in_target: None,
                referenced_artifact: Some(in_source.artifact_id().clone()),
            }),
            // Both sides renamed, to different names.
            (
                Rename {
                    name_before,
                    name_after: src_name,
                    ..
                },
                Rename {
                    name_after: tgt_name,
                    ..
                },
            ) => Some(DirectoryConflict {
                kind: DirectoryConflictKind::ModMod,
                name_before: Some(name_before.clone()),
                name_in_source: Some(src_name.clone()),
                name_in_target: Some(tgt_name.clone()),
                referenced_artifact: Some(in_source.artifact_id().clone()),
            }),
            // Add/Remove pairs cannot co-occur for one artifact id: an add
            // means the id was absent from the ancestor, a remove means it
            // was present.
            _ => None,
        }
    }
}

impl MergeAgent for DirectoryAgent {
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

        let ancestor_dir = Self::decode(ancestor.content()?)?;
        let source_dir = Self::decode(source.content()?)?;
        let target_dir = Self::decode(target.content()?)?;

        let ancestor_idx = index_by_artifact(&ancestor_dir);
        let source_idx = index_by_artifact(&source_dir);
        let target_idx = index_by_artifact(&target_dir);

        let source_changes = directory_changes(&ancestor_idx, &source_idx);
        let target_changes = directory_changes(&ancestor_idx, &target_idx);
        debug!(
            artifact = %ancestor.artifact_id(),
            source_changes = source_changes.len(),
            target_changes = target_changes.len(),
            "computed directory changes"
        );

        // The target seeds the proposal, so target-side changes are already
        // reflected; only source-side changes need walking.
        let mut proposed = target_dir.clone();
        let mut conflict_details: Vec<DirectoryConflict> = Vec::new();

        for change in &source_changes {
            // A same-named add on both sides for different artifacts is a
            // name collision regardless of per-artifact pairing.
            if let DirectoryChange::Add { artifact, name } = change {
                let colliding = target_changes.iter().any(|t| {
                    matches!(t, DirectoryChange::Add { artifact: tgt_artifact, name: tgt_name }
                        if tgt_name == name && tgt_artifact != artifact)
                });
                if colliding {
                    conflict_details.push(DirectoryConflict {
                        kind: DirectoryConflictKind::AddAdd,
                        name_before: None,
                        name_in_source: Some(name.clone()),
                        name_in_target: Some(name.clone()),
                        referenced_artifact: None,
                    });
                    continue;
                }
            }

            let counterpart = target_changes
                .iter()
                .find(|t| t.artifact_id() == change.artifact_id());

            match counterpart {
                None => {
                    // Only the source touched this artifact. Apply the change
                    // unless it would steal a name another artifact holds in
                    // the proposal; that is a name collision, not a failure.
                    let new_name = match change {
                        DirectoryChange::Add { name, .. } => Some(name),
                        DirectoryChange::Rename { name_after, .. } => Some(name_after),
                        DirectoryChange::Remove { .. } => None,
                    };
                    let collides = new_name.is_some_and(|name| {
                        proposed
                            .artifact_for_name(name)
                            .is_some_and(|held_by| held_by != change.artifact_id())
                    });
                    if collides {
                        conflict_details.push(DirectoryConflict {
                            kind: DirectoryConflictKind::AddAdd,
                            name_before: None,
                            name_in_source: new_name.cloned(),
                            name_in_target: new_name.cloned(),
                            referenced_artifact: Some(change.artifact_id().clone()),
                        });
                    } else {
                        proposed = change.apply_to(&proposed)?;
                    }
                }
                Some(in_target) if in_target == change => {
                    // Identical change on both sides: already reflected in
                    // the target-seeded proposal.
                }
                Some(in_target) => {
                    if let Some(details) = Self::classify_pair(change, in_target) {
                        conflict_details.push(details);
                    }
                }
            }
        }

        let conflicts = conflict_details
            .into_iter()
            .map(|details| {
                Ok(MergeConflict {
                    id: ConflictId::fresh(CONFLICT_CATEGORY)?,
                    artifact_id: ancestor.artifact_id().clone(),
                    source_version: source.id().clone(),
                    target_version: target.id().clone(),
                    change_step: change_step.clone(),
                    details: ConflictDetails::Directory(details),
                })
            })
            .collect::<Result<Vec<_>, RepoError>>()?;
        if !conflicts.is_empty() {
            debug!(
                artifact = %ancestor.artifact_id(),
                conflicts = conflicts.len(),
                "directory merge produced conflicts"
            );
        }

        Ok(MergeResult {
            artifact_type: Self::ARTIFACT_TYPE.to_owned(),
            artifact_id: ancestor.artifact_id().clone(),
            ancestor_version: ancestor.id().clone(),
            source_version: source.id().clone(),
            target_version: target.id().clone(),
            proposed_merge: Self::encode(&proposed)?,
            conflicts,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
