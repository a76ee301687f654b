//! Opaque typed identifiers for artifacts, versions, changes, and conflicts.
//!
//! Every identifier is a validated newtype over a 32-character lowercase hex
//! string, so ids survive serialization round-trips unchanged and malformed
//! ids are rejected at the boundary instead of deep inside a merge.
//! [`ConflictId`] additionally carries a category tag (`textMerge-…`,
//! `dirMerge-…`, `baselineMerge-…`); the tag is advisory metadata for humans
//! reading conflict records and is never parsed back.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::RepoError;

/// Length of the random hex payload in every identifier.
const HEX_LEN: usize = 32;

/// Allocate a fresh random 32-character lowercase hex payload.
fn fresh_hex() -> String {
    let mut rng = rand::rng();
    format!("{:032x}", rng.random::<u128>())
}

fn is_lower_hex(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// The kind of identifier that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdKind {
    /// An [`ArtifactId`].
    Artifact,
    /// A [`VersionId`].
    Version,
    /// A [`ChangeId`].
    Change,
    /// A [`ChangeStepId`].
    ChangeStep,
    /// A [`ConflictId`].
    Conflict,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact => write!(f, "ArtifactId"),
            Self::Version => write!(f, "VersionId"),
            Self::Change => write!(f, "ChangeId"),
            Self::ChangeStep => write!(f, "ChangeStepId"),
            Self::Conflict => write!(f, "ConflictId"),
        }
    }
}

/// A validation error for a typed identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdError {
    /// What kind of identifier was being validated.
    pub kind: IdKind,
    /// The invalid value.
    pub value: String,
    /// Human-readable explanation.
    pub reason: String,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: {:?} — {}",
            self.kind, self.value, self.reason
        )
    }
}

impl std::error::Error for IdError {}

impl From<IdError> for RepoError {
    fn from(err: IdError) -> Self {
        Self::InvalidParameter {
            detail: err.to_string(),
        }
    }
}

fn validate_hex(kind: IdKind, s: &str) -> Result<(), IdError> {
    if s.len() != HEX_LEN {
        return Err(IdError {
            kind,
            value: s.to_owned(),
            reason: format!("expected {HEX_LEN} hex characters, got {}", s.len()),
        });
    }
    if !is_lower_hex(s) {
        return Err(IdError {
            kind,
            value: s.to_owned(),
            reason: "must contain only lowercase hex characters (0-9, a-f)".to_owned(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ArtifactId
// ---------------------------------------------------------------------------

/// Identifier of a logical artifact (file, directory, baseline).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Create an `ArtifactId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error unless the string is exactly 32 lowercase hex chars.
    pub fn new(s: &str) -> Result<Self, IdError> {
        validate_hex(IdKind::Artifact, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Allocate a fresh random `ArtifactId`.
    #[must_use]
    pub fn fresh() -> Self {
        Self(fresh_hex())
    }

    /// Return the inner hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = IdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_hex(IdKind::Artifact, &s)?;
        Ok(Self(s))
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// VersionId
// ---------------------------------------------------------------------------

/// Identifier of one version of an artifact.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    /// Create a `VersionId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error unless the string is exactly 32 lowercase hex chars.
    pub fn new(s: &str) -> Result<Self, IdError> {
        validate_hex(IdKind::Version, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Allocate a fresh random `VersionId`.
    #[must_use]
    pub fn fresh() -> Self {
        Self(fresh_hex())
    }

    /// Return the inner hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = IdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_hex(IdKind::Version, &s)?;
        Ok(Self(s))
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ChangeId
// ---------------------------------------------------------------------------

/// Identifier of a change (a named unit of work in a project history).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChangeId(String);

impl ChangeId {
    /// Create a `ChangeId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error unless the string is exactly 32 lowercase hex chars.
    pub fn new(s: &str) -> Result<Self, IdError> {
        validate_hex(IdKind::Change, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Allocate a fresh random `ChangeId`.
    #[must_use]
    pub fn fresh() -> Self {
        Self(fresh_hex())
    }

    /// Return the inner hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChangeId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChangeId {
    type Error = IdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_hex(IdKind::Change, &s)?;
        Ok(Self(s))
    }
}

impl From<ChangeId> for String {
    fn from(id: ChangeId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ChangeStepId
// ---------------------------------------------------------------------------

/// Identifier of a single step within a change. Merge results record the
/// step under which the merge was performed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChangeStepId(String);

impl ChangeStepId {
    /// Create a `ChangeStepId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error unless the string is exactly 32 lowercase hex chars.
    pub fn new(s: &str) -> Result<Self, IdError> {
        validate_hex(IdKind::ChangeStep, s)?;
        Ok(Self(s.to_owned()))
    }

    /// Allocate a fresh random `ChangeStepId`.
    #[must_use]
    pub fn fresh() -> Self {
        Self(fresh_hex())
    }

    /// Return the inner hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeStepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChangeStepId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChangeStepId {
    type Error = IdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate_hex(IdKind::ChangeStep, &s)?;
        Ok(Self(s))
    }
}

impl From<ChangeStepId> for String {
    fn from(id: ChangeStepId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// ConflictId
// ---------------------------------------------------------------------------

/// Identifier of a merge conflict record: `<category>-<32 hex>`.
///
/// The category names the agent that produced the conflict. It is advisory
/// only; nothing parses it back out of the id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConflictId(String);

impl ConflictId {
    /// Create a `ConflictId` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error unless the string is `<category>-<32 hex>` with an
    /// ASCII-alphanumeric category.
    pub fn new(s: &str) -> Result<Self, IdError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Allocate a fresh `ConflictId` tagged with `category`.
    ///
    /// # Errors
    /// Returns an error if the category is empty or not ASCII-alphanumeric.
    pub fn fresh(category: &str) -> Result<Self, IdError> {
        Self::validate_category(category, category)?;
        Ok(Self(format!("{category}-{}", fresh_hex())))
    }

    /// Return the full id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the category tag.
    #[must_use]
    pub fn category(&self) -> &str {
        // Validation guarantees exactly one separator.
        self.0.split_once('-').map_or("", |(cat, _)| cat)
    }

    fn validate_category(category: &str, whole: &str) -> Result<(), IdError> {
        if category.is_empty() || !category.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdError {
                kind: IdKind::Conflict,
                value: whole.to_owned(),
                reason: "category must be non-empty ASCII alphanumeric".to_owned(),
            });
        }
        Ok(())
    }

    fn validate(s: &str) -> Result<(), IdError> {
        let Some((category, hex)) = s.split_once('-') else {
            return Err(IdError {
                kind: IdKind::Conflict,
                value: s.to_owned(),
                reason: "expected '<category>-<hex>' form".to_owned(),
            });
        };
        Self::validate_category(category, s)?;
        if hex.len() != HEX_LEN || !is_lower_hex(hex) {
            return Err(IdError {
                kind: IdKind::Conflict,
                value: s.to_owned(),
                reason: format!("payload must be {HEX_LEN} lowercase hex characters"),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConflictId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ConflictId {
    type Error = IdError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<ConflictId> for String {
    fn from(id: ConflictId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
