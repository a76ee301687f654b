//! The merge agent registry: artifact type → agent dispatch.
//!
//! One agent serves each artifact type. Lookup failures are `NotFound`;
//! registering two agents for one type is a `Conflict`. The registry is the
//! only dispatch point — callers never name concrete agents.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::RepoError;
use crate::merge::baseline::BaselineAgent;
use crate::merge::directory::DirectoryAgent;
use crate::merge::text::TextAgent;
use crate::merge::types::{MergeAgent, MergeResult};
use crate::model::ids::ChangeStepId;
use crate::model::version::ArtifactVersion;

// ---------------------------------------------------------------------------
// AgentRegistry
// ---------------------------------------------------------------------------

/// Maps artifact type tags to their merge agents.
#[derive(Default)]
pub struct AgentRegistry {
    agents: BTreeMap<&'static str, Box<dyn MergeAgent>>,
}

impl AgentRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in agents (text, directory, baseline)
    /// registered.
    #[must_use]
    pub fn with_builtin_agents() -> Self {
        let mut registry = Self::new();
        // Registering distinct built-in types cannot collide.
        let _ = registry.register(Box::new(TextAgent));
        let _ = registry.register(Box::new(DirectoryAgent));
        let _ = registry.register(Box::new(BaselineAgent));
        registry
    }

    /// Register an agent under its artifact type.
    ///
    /// # Errors
    /// Fails with `Conflict` if the type already has an agent.
    pub fn register(&mut self, agent: Box<dyn MergeAgent>) -> Result<(), RepoError> {
        let artifact_type = agent.artifact_type();
        if self.agents.contains_key(artifact_type) {
            return Err(RepoError::conflict(format!(
                "an agent is already registered for artifact type '{artifact_type}'"
            )));
        }
        self.agents.insert(artifact_type, agent);
        Ok(())
    }

    /// Look up the agent for `artifact_type`.
    ///
    /// # Errors
    /// Fails with `NotFound` if no agent is registered for the type.
    pub fn resolve(&self, artifact_type: &str) -> Result<&dyn MergeAgent, RepoError> {
        self.agents
            .get(artifact_type)
            .map(|agent| &**agent)
            .ok_or_else(|| {
                RepoError::not_found(format!(
                    "no merge agent registered for artifact type '{artifact_type}'"
                ))
            })
    }

    /// Dispatch a three-way merge to the agent registered for
    /// `artifact_type`.
    ///
    /// # Errors
    /// Fails with `NotFound` for unregistered types, plus whatever the
    /// agent's own `merge` can fail with.
    pub fn merge(
        &self,
        artifact_type: &str,
        change_step: &ChangeStepId,
        ancestor: &ArtifactVersion,
        source: &ArtifactVersion,
        target: &ArtifactVersion,
    ) -> Result<MergeResult, RepoError> {
        let agent = self.resolve(artifact_type)?;
        debug!(
            artifact_type,
            artifact = %ancestor.artifact_id(),
            "dispatching merge"
        );
        agent.merge(change_step, ancestor, source, target)
    }

    /// The registered artifact types, in order.
    pub fn registered_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.agents.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ArtifactId;

    #[test]
    fn builtin_registry_serves_all_three_types() {
        let registry = AgentRegistry::with_builtin_agents();
        let types: Vec<_> = registry.registered_types().collect();
        assert_eq!(types, ["baseline", "directory", "text"]);
        for ty in types {
            assert_eq!(registry.resolve(ty).unwrap().artifact_type(), ty);
        }
    }

    #[test]
    fn unknown_type_is_not_found() {
        let registry = AgentRegistry::with_builtin_agents();
        let err = registry.resolve("image").unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert!(format!("{err}").contains("image"));
    }

    #[test]
    fn duplicate_registration_is_conflict() {
        let mut registry = AgentRegistry::with_builtin_agents();
        let err = registry.register(Box::new(TextAgent)).unwrap_err();
        assert!(matches!(err, RepoError::Conflict { .. }));
    }

    #[test]
    fn empty_registry_resolves_nothing() {
        let registry = AgentRegistry::new();
        assert!(registry.resolve("text").is_err());
        assert_eq!(registry.registered_types().count(), 0);
    }

    #[test]
    fn merge_dispatches_by_type() {
        let registry = AgentRegistry::with_builtin_agents();
        let artifact = ArtifactId::fresh();
        let make = |content: &[u8]| {
            ArtifactVersion::new_working(artifact.clone(), "text", content.to_vec(), vec![])
        };
        let (anc, src, tgt) = (make(b"a\n"), make(b"a\nb\n"), make(b"a\n"));
        let result = registry
            .merge("text", &ChangeStepId::fresh(), &anc, &src, &tgt)
            .unwrap();
        assert_eq!(result.artifact_type, "text");
        assert_eq!(result.proposed_merge, b"a\nb\n");
    }

    #[test]
    fn merge_with_unknown_type_fails_before_decoding() {
        let registry = AgentRegistry::new();
        let artifact = ArtifactId::fresh();
        let v = ArtifactVersion::new_working(artifact, "text", vec![], vec![]);
        assert!(matches!(
            registry.merge("text", &ChangeStepId::fresh(), &v, &v, &v),
            Err(RepoError::NotFound { .. })
        ));
    }
}
