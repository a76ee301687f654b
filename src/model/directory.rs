//! Directory artifacts: ordered name → artifact bindings.
//!
//! A directory is a list of `(name, artifact)` entries with unique names.
//! The mutation primitives enforce uniqueness and fail on violations —
//! a duplicate binding is a caller-side programming error, never a merge
//! outcome. [`DirectoryChange`] is the derived structural-change vocabulary
//! the directory merge agent works with; changes are computed per merge and
//! never persisted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::RepoError;
use crate::model::ids::ArtifactId;

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// One name → artifact binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Binding name, unique within the directory.
    pub name: String,
    /// The bound artifact.
    pub artifact: ArtifactId,
}

/// An ordered list of name → artifact bindings with unique names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// An empty directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a directory from entries, validating name uniqueness.
    ///
    /// # Errors
    /// Fails with `InvalidParameter` if two entries share a name.
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Result<Self, RepoError> {
        let dir = Self { entries };
        dir.check_name_uniqueness()?;
        Ok(dir)
    }

    /// Verify that no name is bound twice.
    ///
    /// Decoded directories pass through this before a merge touches them,
    /// so a malformed encoding surfaces as `InvalidParameter` rather than
    /// as nonsense merge output.
    pub fn check_name_uniqueness(&self) -> Result<(), RepoError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(RepoError::invalid_parameter(format!(
                    "directory binds name '{}' more than once",
                    entry.name
                )));
            }
        }
        Ok(())
    }

    /// The bindings, in order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for an empty directory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `name` is bound.
    #[must_use]
    pub fn contains_binding(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Look up the artifact bound to `name`.
    #[must_use]
    pub fn artifact_for_name(&self, name: &str) -> Option<&ArtifactId> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.artifact)
    }

    /// Look up the name binding `artifact`.
    #[must_use]
    pub fn name_for_artifact(&self, artifact: &ArtifactId) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| &e.artifact == artifact)
            .map(|e| e.name.as_str())
    }

    /// Bind `name` to `artifact`.
    ///
    /// # Errors
    /// Fails with `Conflict` if `name` is already bound.
    pub fn add_binding(
        &mut self,
        name: impl Into<String>,
        artifact: ArtifactId,
    ) -> Result<(), RepoError> {
        let name = name.into();
        if self.contains_binding(&name) {
            return Err(RepoError::conflict(format!(
                "binding already exists for '{name}'"
            )));
        }
        self.entries.push(DirectoryEntry { name, artifact });
        Ok(())
    }

    /// Remove the binding for `name`, returning the artifact it bound.
    ///
    /// # Errors
    /// Fails with `NotFound` if `name` is not bound.
    pub fn remove_binding(&mut self, name: &str) -> Result<ArtifactId, RepoError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| RepoError::not_found(format!("no binding for '{name}'")))?;
        Ok(self.entries.remove(idx).artifact)
    }
}

// ---------------------------------------------------------------------------
// DirectoryChange
// ---------------------------------------------------------------------------

/// A structural change between a base directory and a modified one.
///
/// Derived per merge, keyed by artifact identity: an artifact present only
/// in the modified side was added, one present only in the base was removed,
/// and one present in both under different names was renamed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryChange {
    /// The artifact was bound in the modified side only.
    Add {
        /// The artifact that appeared.
        artifact: ArtifactId,
        /// Its name in the modified side.
        name: String,
    },
    /// The artifact is bound in both sides, under different names.
    Rename {
        /// The artifact that moved.
        artifact: ArtifactId,
        /// Its name in the base.
        name_before: String,
        /// Its name in the modified side.
        name_after: String,
    },
    /// The artifact was bound in the base only.
    Remove {
        /// The artifact that disappeared.
        artifact: ArtifactId,
        /// Its name in the base.
        name_before: String,
    },
}

impl DirectoryChange {
    /// The artifact this change is about.
    #[must_use]
    pub const fn artifact_id(&self) -> &ArtifactId {
        match self {
            Self::Add { artifact, .. }
            | Self::Rename { artifact, .. }
            | Self::Remove { artifact, .. } => artifact,
        }
    }

    /// Apply this change (computed against one branch) to a different
    /// directory, producing a new directory.
    ///
    /// # Errors
    /// Propagates the mutation primitives' failures: adding over an existing
    /// name is a `Conflict`, removing or renaming a missing name is
    /// `NotFound`.
    pub fn apply_to(&self, dir: &Directory) -> Result<Directory, RepoError> {
        let mut out = dir.clone();
        match self {
            Self::Add { artifact, name } => {
                out.add_binding(name.clone(), artifact.clone())?;
            }
            Self::Rename {
                artifact,
                name_before,
                name_after,
            } => {
                out.remove_binding(name_before)?;
                out.add_binding(name_after.clone(), artifact.clone())?;
            }
            Self::Remove { name_before, .. } => {
                out.remove_binding(name_before)?;
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
