//! Repository error types.
//!
//! Defines [`RepoError`], the unified error type for repository and merge
//! operations. Divergent content discovered during a merge is never an error —
//! it is reported as conflict records in the merge result. `RepoError` is
//! reserved for caller-side mistakes (duplicate bindings, malformed
//! specifiers), missing entities, and invariant violations.

use std::fmt;

// ---------------------------------------------------------------------------
// RepoError
// ---------------------------------------------------------------------------

/// Unified error type for repository operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoError {
    /// A parameter was malformed: a bad identifier, an unparsable specifier
    /// string, or a structurally invalid decoded value.
    InvalidParameter {
        /// Human-readable description of the problem.
        detail: String,
    },

    /// An operation would violate a uniqueness invariant, such as adding a
    /// directory binding for a name that is already bound, or registering a
    /// second agent for the same artifact type.
    ///
    /// Distinct from merge conflicts, which are data records in a
    /// [`MergeResult`](crate::merge::MergeResult), not failures.
    Conflict {
        /// Human-readable description of the collision.
        detail: String,
    },

    /// A referenced entity does not exist: no agent registered for an
    /// artifact type, no binding under a name, no baseline entry for an id,
    /// or a version whose content has been discarded.
    NotFound {
        /// Human-readable description of what was missing.
        detail: String,
    },

    /// An internal invariant was broken. Indicates a bug, not caller error.
    Internal {
        /// Human-readable description.
        detail: String,
    },
}

impl RepoError {
    /// Build an [`RepoError::InvalidParameter`].
    pub fn invalid_parameter(detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            detail: detail.into(),
        }
    }

    /// Build a [`RepoError::Conflict`].
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    /// Build a [`RepoError::NotFound`].
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    /// Build an [`RepoError::Internal`].
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { detail } => write!(f, "invalid parameter: {detail}"),
            Self::Conflict { detail } => write!(f, "conflict: {detail}"),
            Self::NotFound { detail } => write!(f, "not found: {detail}"),
            Self::Internal { detail } => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidParameter {
            detail: format!("malformed content encoding: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
