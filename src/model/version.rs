//! The artifact version envelope and its lifecycle.
//!
//! A version is created Working (mutable content), then transitions exactly
//! once to Committed (content frozen, digest recorded) or Aborted (content
//! discarded, unreadable). Merge agents receive fully materialized versions;
//! they never fetch from storage themselves.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::RepoError;
use crate::model::ids::{ArtifactId, VersionId};

// ---------------------------------------------------------------------------
// VersionStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an [`ArtifactVersion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Content may still be replaced.
    Working,
    /// Content is frozen permanently.
    Committed,
    /// Terminal; content has been discarded.
    Aborted,
}

impl VersionStatus {
    /// Returns `true` for a working version.
    #[must_use]
    pub const fn is_working(self) -> bool {
        matches!(self, Self::Working)
    }

    /// Returns `true` for a committed version.
    #[must_use]
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }

    /// Returns `true` for an aborted version.
    #[must_use]
    pub const fn is_aborted(self) -> bool {
        matches!(self, Self::Aborted)
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Committed => write!(f, "committed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactVersion
// ---------------------------------------------------------------------------

/// One snapshot of an artifact's content, with parent links.
///
/// Fields are private so the Working → Committed/Aborted lifecycle cannot be
/// bypassed: content is only replaceable while Working, and unreadable once
/// Aborted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactVersion {
    id: VersionId,
    artifact_id: ArtifactId,
    artifact_type: String,
    content: Vec<u8>,
    parents: Vec<VersionId>,
    status: VersionStatus,
    /// SHA-256 of the content, recorded at commit time.
    digest: Option<String>,
}

impl ArtifactVersion {
    /// Create a fresh Working version with the given content and parents.
    #[must_use]
    pub fn new_working(
        artifact_id: ArtifactId,
        artifact_type: impl Into<String>,
        content: Vec<u8>,
        parents: Vec<VersionId>,
    ) -> Self {
        Self {
            id: VersionId::fresh(),
            artifact_id,
            artifact_type: artifact_type.into(),
            content,
            parents,
            status: VersionStatus::Working,
            digest: None,
        }
    }

    /// Start a new Working version from `base`: same artifact, copied
    /// content, parent link back to `base`.
    ///
    /// # Errors
    /// Fails if `base` has been aborted (its content is gone).
    pub fn working_copy_of(base: &Self) -> Result<Self, RepoError> {
        let content = base.content()?.to_vec();
        Ok(Self::new_working(
            base.artifact_id.clone(),
            base.artifact_type.clone(),
            content,
            vec![base.id.clone()],
        ))
    }

    /// The version's own id.
    #[must_use]
    pub fn id(&self) -> &VersionId {
        &self.id
    }

    /// The owning artifact's id.
    #[must_use]
    pub fn artifact_id(&self) -> &ArtifactId {
        &self.artifact_id
    }

    /// The declared artifact type tag (e.g. `"text"`).
    #[must_use]
    pub fn artifact_type(&self) -> &str {
        &self.artifact_type
    }

    /// Parent version ids, oldest first.
    #[must_use]
    pub fn parents(&self) -> &[VersionId] {
        &self.parents
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> VersionStatus {
        self.status
    }

    /// SHA-256 hex digest of the content, present once committed.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The content bytes.
    ///
    /// # Errors
    /// Fails with `NotFound` once the version has been aborted: aborted
    /// content is discarded and unreadable.
    pub fn content(&self) -> Result<&[u8], RepoError> {
        if self.status.is_aborted() {
            return Err(RepoError::not_found(format!(
                "content of aborted version {} has been discarded",
                self.id
            )));
        }
        Ok(&self.content)
    }

    /// Replace the content of a Working version.
    ///
    /// # Errors
    /// Fails with `Conflict` unless the version is still Working.
    pub fn replace_content(&mut self, content: Vec<u8>) -> Result<(), RepoError> {
        if !self.status.is_working() {
            return Err(RepoError::conflict(format!(
                "cannot replace content of {} version {}",
                self.status, self.id
            )));
        }
        self.content = content;
        Ok(())
    }

    /// Freeze this version permanently, recording its content digest.
    ///
    /// # Errors
    /// Fails with `Conflict` unless the version is still Working; the
    /// transition happens exactly once.
    pub fn commit(&mut self) -> Result<(), RepoError> {
        if !self.status.is_working() {
            return Err(RepoError::conflict(format!(
                "cannot commit {} version {}",
                self.status, self.id
            )));
        }
        self.digest = Some(format!("{:x}", Sha256::digest(&self.content)));
        self.status = VersionStatus::Committed;
        Ok(())
    }

    /// Abandon this version, discarding its content.
    ///
    /// # Errors
    /// Fails with `Conflict` unless the version is still Working.
    pub fn abort(&mut self) -> Result<(), RepoError> {
        if !self.status.is_working() {
            return Err(RepoError::conflict(format!(
                "cannot abort {} version {}",
                self.status, self.id
            )));
        }
        self.content.clear();
        self.status = VersionStatus::Aborted;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
