//! Baseline artifacts: a flat manifest snapshot of a tree.
//!
//! A baseline maps each artifact id to the version that participates in one
//! consistent snapshot, rooted at a single directory artifact. An artifact
//! appears at most once; changing an entry is an atomic remove+add so the
//! uniqueness invariant can never be observed broken.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RepoError;
use crate::model::ids::{ArtifactId, VersionId};

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

/// A snapshot manifest: artifact id → version id, plus the root directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    root_dir: ArtifactId,
    entries: BTreeMap<ArtifactId, VersionId>,
}

impl Baseline {
    /// An empty baseline rooted at `root_dir`.
    #[must_use]
    pub const fn new(root_dir: ArtifactId) -> Self {
        Self {
            root_dir,
            entries: BTreeMap::new(),
        }
    }

    /// The root directory artifact of this snapshot.
    #[must_use]
    pub const fn root_dir(&self) -> &ArtifactId {
        &self.root_dir
    }

    /// Returns `true` if `artifact` has an entry.
    #[must_use]
    pub fn contains(&self, artifact: &ArtifactId) -> bool {
        self.entries.contains_key(artifact)
    }

    /// Look up the version mapped for `artifact`.
    #[must_use]
    pub fn get(&self, artifact: &ArtifactId) -> Option<&VersionId> {
        self.entries.get(artifact)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for a baseline with no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in artifact-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactId, &VersionId)> {
        self.entries.iter()
    }

    /// Map a new artifact into the snapshot.
    ///
    /// # Errors
    /// Fails with `Conflict` if the artifact already has an entry.
    pub fn add(&mut self, artifact: ArtifactId, version: VersionId) -> Result<(), RepoError> {
        if self.entries.contains_key(&artifact) {
            return Err(RepoError::conflict(format!(
                "baseline already contains a mapping for {artifact}"
            )));
        }
        self.entries.insert(artifact, version);
        Ok(())
    }

    /// Drop the entry for `artifact`.
    ///
    /// # Errors
    /// Fails with `NotFound` if there is no entry.
    pub fn remove(&mut self, artifact: &ArtifactId) -> Result<VersionId, RepoError> {
        self.entries.remove(artifact).ok_or_else(|| {
            RepoError::not_found(format!("baseline doesn't contain a mapping for {artifact}"))
        })
    }

    /// Replace the version mapped for `artifact`: an atomic remove+add.
    ///
    /// # Errors
    /// Fails with `NotFound` if the artifact has no existing entry.
    pub fn change(&mut self, artifact: &ArtifactId, version: VersionId) -> Result<(), RepoError> {
        self.remove(artifact)?;
        self.add(artifact.clone(), version)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
