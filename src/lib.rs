//! tessera — a typed-artifact version store with per-type three-way merge.
//!
//! Artifacts (text files, directories, baseline snapshots) are tracked as
//! immutable version graphs. Divergent histories are reconciled by
//! per-artifact-type merge agents: an anchor-aligned line merge for text, a
//! structural identity-keyed merge for directories, and a manifest merge
//! with a deterministic precedence policy for baselines. Divergence is
//! always reported as conflict records in the merge result, never as an
//! error.
//!
//! Storage, authentication, and the network surface are external
//! collaborators: this crate receives fully materialized versions and
//! returns proposed merges for the caller to persist.

pub mod error;
pub mod merge;
pub mod model;

pub use error::RepoError;
pub use merge::{AgentRegistry, MergeConflict, MergeResult};
