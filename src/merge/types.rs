//! Core types for the merge engine: the conflict/result envelope and the
//! per-artifact-type agent capability.
//!
//! Divergence discovered during a merge is always data, never a failure:
//! agents return a [`MergeResult`] holding a proposed merged encoding plus
//! zero or more [`MergeConflict`] records. Errors are reserved for malformed
//! inputs and caller mistakes.

use serde::{Deserialize, Serialize};

use crate::error::RepoError;
use crate::model::ids::{ArtifactId, ChangeStepId, ConflictId, VersionId};
use crate::model::version::ArtifactVersion;

// ---------------------------------------------------------------------------
// Conflict detail payloads
// ---------------------------------------------------------------------------

/// Classification of a baseline merge conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaselineConflictKind {
    /// Target removed the entry; source modified it.
    DelMod,
    /// Source removed the entry; target modified it.
    ModDel,
    /// Both sides modified the entry to different versions.
    ModMod,
}

/// Details of one baseline merge conflict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineConflict {
    /// What diverged.
    pub kind: BaselineConflictKind,
    /// The source branch's version for the entry, when it still has one.
    pub source_version: Option<VersionId>,
    /// The target branch's version for the entry, when it still has one.
    pub target_version: Option<VersionId>,
}

/// Classification of a directory merge conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectoryConflictKind {
    /// Both sides bound the same name to different artifacts.
    AddAdd,
    /// One side removed a binding the other side renamed.
    DelMod,
    /// Both sides renamed the same artifact to different names.
    ModMod,
}

/// Details of one directory merge conflict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConflict {
    /// What diverged.
    pub kind: DirectoryConflictKind,
    /// The name in the common ancestor, when the artifact was bound there.
    pub name_before: Option<String>,
    /// The name the source branch ended up with, when it kept one.
    pub name_in_source: Option<String>,
    /// The name the target branch ended up with, when it kept one.
    pub name_in_target: Option<String>,
    /// The artifact the conflict is about, when a single one is implicated.
    pub referenced_artifact: Option<ArtifactId>,
}

/// Details of one text merge conflict: the `[start, end)` line range of the
/// conflict-marker block within the proposed merge output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextConflict {
    /// Output line index of the opening conflict marker.
    pub start_line: usize,
    /// Output line index one past the closing conflict marker.
    pub end_line: usize,
}

/// Agent-specific conflict details, tagged by the producing agent family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "agent", rename_all = "snake_case")]
pub enum ConflictDetails {
    /// From the baseline merge agent.
    Baseline(BaselineConflict),
    /// From the directory merge agent.
    Directory(DirectoryConflict),
    /// From the text merge agent.
    Text(TextConflict),
}

// ---------------------------------------------------------------------------
// MergeConflict / MergeResult
// ---------------------------------------------------------------------------

/// A durable record of unresolved divergence produced during a merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    /// Unique, category-tagged conflict id.
    pub id: ConflictId,
    /// The artifact being merged.
    pub artifact_id: ArtifactId,
    /// The source branch version.
    pub source_version: VersionId,
    /// The target branch version.
    pub target_version: VersionId,
    /// The change step the merge is performed under.
    pub change_step: ChangeStepId,
    /// Agent-specific detail payload.
    pub details: ConflictDetails,
}

/// The output envelope of one artifact-level merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// The artifact type the dispatching agent was registered under.
    pub artifact_type: String,
    /// The artifact that was merged.
    pub artifact_id: ArtifactId,
    /// The common ancestor version.
    pub ancestor_version: VersionId,
    /// The source branch version.
    pub source_version: VersionId,
    /// The target branch version.
    pub target_version: VersionId,
    /// The proposed merged content, encoded in the artifact's wire format.
    pub proposed_merge: Vec<u8>,
    /// Conflicts discovered during the merge, in output order.
    pub conflicts: Vec<MergeConflict>,
}

impl MergeResult {
    /// Returns `true` if the merge produced no conflicts.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MergeAgent
// ---------------------------------------------------------------------------

/// The merge capability bound to one artifact type.
///
/// Implementations also expose typed inherent `decode`/`encode` functions
/// for their native content form; this trait carries only the object-safe
/// surface the registry dispatches through. `merge` must treat all three
/// input versions as read-only and return a freshly constructed result.
pub trait MergeAgent: Send + Sync + std::fmt::Debug {
    /// The artifact type tag this agent serves.
    fn artifact_type(&self) -> &'static str;

    /// Three-way merge of one artifact.
    ///
    /// # Errors
    /// Fails only on malformed inputs: undecodable content, unreadable
    /// (aborted) versions, or versions that disagree about the artifact
    /// being merged. Divergent content is reported via conflicts in the
    /// result, never as an error.
    fn merge(
        &self,
        change_step: &ChangeStepId,
        ancestor: &ArtifactVersion,
        source: &ArtifactVersion,
        target: &ArtifactVersion,
    ) -> Result<MergeResult, RepoError>;
}

/// Shared input validation for merge agents: the three versions must belong
/// to one artifact and carry the agent's artifact type.
pub(crate) fn validate_merge_inputs(
    artifact_type: &str,
    ancestor: &ArtifactVersion,
    source: &ArtifactVersion,
    target: &ArtifactVersion,
) -> Result<(), RepoError> {
    for version in [ancestor, source, target] {
        if version.artifact_id() != ancestor.artifact_id() {
            return Err(RepoError::invalid_parameter(format!(
                "merge inputs span artifacts {} and {}",
                ancestor.artifact_id(),
                version.artifact_id()
            )));
        }
        if version.artifact_type() != artifact_type {
            return Err(RepoError::invalid_parameter(format!(
                "version {} has type '{}', expected '{artifact_type}'",
                version.id(),
                version.artifact_type()
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
