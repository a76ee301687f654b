//! Property tests for the merge agents.
//!
//! Uses proptest to generate random merge scenarios and verify the
//! algebraic guarantees the agents advertise:
//!
//! - **Idempotence**: merging a version against itself (ancestor = source =
//!   target) is conflict-free and returns the input bytes unchanged.
//! - **One-sided change**: when one branch equals the ancestor, the proposed
//!   merge equals the other branch, with zero conflicts.
//! - **Anchor ordering**: alignment anchors are non-decreasing in emission
//!   order for arbitrary edits.
//! - **Directory uniqueness**: the proposed merged directory never binds a
//!   name twice.
//! - **Baseline conflict completeness**: every id modified to different
//!   versions in both branches yields exactly one MOD_MOD conflict and is
//!   absent from the proposal; the proposal itself is deterministic.

#![allow(clippy::all, clippy::pedantic, clippy::nursery)]

use proptest::prelude::*;

use crate::merge::align::align;
use crate::merge::baseline::BaselineAgent;
use crate::merge::directory::DirectoryAgent;
use crate::merge::text::TextAgent;
use crate::merge::types::{
    BaselineConflictKind, ConflictDetails, MergeAgent, MergeResult,
};
use crate::model::baseline::Baseline;
use crate::model::directory::Directory;
use crate::model::ids::{ArtifactId, ChangeStepId, VersionId};
use crate::model::version::ArtifactVersion;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A small pool of stable artifact ids: repeated single hex digits.
fn pool_artifact(i: usize) -> ArtifactId {
    let digit = char::from_digit((i % 10) as u32, 10).unwrap();
    ArtifactId::new(&digit.to_string().repeat(32)).unwrap()
}

/// A small pool of stable version ids.
fn pool_version(i: usize) -> VersionId {
    let c = [b'a', b'b', b'c', b'd', b'e', b'f'][i % 6] as char;
    VersionId::new(&c.to_string().repeat(32)).unwrap()
}

/// Arbitrary short documents: lines drawn from a small alphabet so LCS
/// matches actually occur.
fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("alpha\n".to_owned()),
            Just("beta\n".to_owned()),
            Just("gamma\n".to_owned()),
            Just("delta\n".to_owned()),
            "[a-z]{1,6}\n",
        ],
        0..12,
    )
}

/// Arbitrary directory over a pooled id space: a set of (name, artifact)
/// pairs with unique names and unique artifacts.
fn arb_directory() -> impl Strategy<Value = Directory> {
    prop::collection::btree_map(0usize..6, "[a-e]\\.txt", 0..5).prop_map(|by_artifact| {
        let mut dir = Directory::new();
        for (artifact_idx, name) in by_artifact {
            // Names may repeat across artifact indices; keep first binding.
            if !dir.contains_binding(&name) {
                dir.add_binding(name, pool_artifact(artifact_idx)).unwrap();
            }
        }
        dir
    })
}

/// Arbitrary baseline over pooled ids and versions.
fn arb_baseline() -> impl Strategy<Value = Baseline> {
    prop::collection::btree_map(0usize..8, 0usize..6, 0..6).prop_map(|entries| {
        let mut bl = Baseline::new(pool_artifact(9));
        for (artifact_idx, version_idx) in entries {
            bl.add(pool_artifact(artifact_idx), pool_version(version_idx))
                .unwrap();
        }
        bl
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn version_of(artifact: &ArtifactId, artifact_type: &str, content: Vec<u8>) -> ArtifactVersion {
    ArtifactVersion::new_working(artifact.clone(), artifact_type, content, vec![])
}

fn merge_text(ancestor: &[u8], source: &[u8], target: &[u8]) -> MergeResult {
    let artifact = ArtifactId::fresh();
    TextAgent
        .merge(
            &ChangeStepId::fresh(),
            &version_of(&artifact, "text", ancestor.to_vec()),
            &version_of(&artifact, "text", source.to_vec()),
            &version_of(&artifact, "text", target.to_vec()),
        )
        .unwrap()
}

fn merge_directories(ancestor: &Directory, source: &Directory, target: &Directory) -> MergeResult {
    let artifact = ArtifactId::fresh();
    let enc = |d: &Directory| DirectoryAgent::encode(d).unwrap();
    DirectoryAgent
        .merge(
            &ChangeStepId::fresh(),
            &version_of(&artifact, "directory", enc(ancestor)),
            &version_of(&artifact, "directory", enc(source)),
            &version_of(&artifact, "directory", enc(target)),
        )
        .unwrap()
}

fn merge_baselines(ancestor: &Baseline, source: &Baseline, target: &Baseline) -> MergeResult {
    let artifact = ArtifactId::fresh();
    let enc = |b: &Baseline| BaselineAgent::encode(b).unwrap();
    BaselineAgent
        .merge(
            &ChangeStepId::fresh(),
            &version_of(&artifact, "baseline", enc(ancestor)),
            &version_of(&artifact, "baseline", enc(source)),
            &version_of(&artifact, "baseline", enc(target)),
        )
        .unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn text_merge_is_idempotent(lines in arb_lines()) {
        let bytes = lines.concat().into_bytes();
        let result = merge_text(&bytes, &bytes, &bytes);
        prop_assert!(result.is_clean());
        prop_assert_eq!(result.proposed_merge, bytes);
    }

    #[test]
    fn text_merge_one_sided_source_wins(
        base in arb_lines(),
        source in arb_lines(),
    ) {
        let base_bytes = base.concat().into_bytes();
        let source_bytes = source.concat().into_bytes();
        let result = merge_text(&base_bytes, &source_bytes, &base_bytes);
        prop_assert!(result.is_clean());
        prop_assert_eq!(result.proposed_merge, source_bytes);
    }

    #[test]
    fn text_merge_one_sided_target_wins(
        base in arb_lines(),
        target in arb_lines(),
    ) {
        let base_bytes = base.concat().into_bytes();
        let target_bytes = target.concat().into_bytes();
        let result = merge_text(&base_bytes, &base_bytes, &target_bytes);
        prop_assert!(result.is_clean());
        prop_assert_eq!(result.proposed_merge, target_bytes);
    }

    #[test]
    fn alignment_anchors_are_non_decreasing(
        base in arb_lines(),
        modified in arb_lines(),
    ) {
        let labeled = align(&base, &modified);
        let anchors: Vec<usize> = labeled.iter().map(|l| l.anchor).collect();
        prop_assert!(
            anchors.windows(2).all(|w| w[0] <= w[1]),
            "anchors must be non-decreasing: {:?}",
            anchors
        );
        // Anchors never point past the end-of-base sentinel.
        prop_assert!(anchors.iter().all(|&a| a <= base.len()));
    }

    #[test]
    fn alignment_labels_every_line_exactly_once(
        base in arb_lines(),
        modified in arb_lines(),
    ) {
        let labeled = align(&base, &modified);
        let base_covered: Vec<usize> =
            labeled.iter().filter_map(|l| l.base_line).collect();
        let modified_covered: Vec<usize> =
            labeled.iter().filter_map(|l| l.modified_line).collect();
        prop_assert_eq!(base_covered, (0..base.len()).collect::<Vec<_>>());
        prop_assert_eq!(modified_covered, (0..modified.len()).collect::<Vec<_>>());
    }

    #[test]
    fn directory_merge_never_duplicates_names(
        ancestor in arb_directory(),
        source in arb_directory(),
        target in arb_directory(),
    ) {
        let result = merge_directories(&ancestor, &source, &target);
        let merged = DirectoryAgent::decode(&result.proposed_merge).unwrap();
        prop_assert!(merged.check_name_uniqueness().is_ok());
    }

    #[test]
    fn directory_merge_is_idempotent(dir in arb_directory()) {
        let result = merge_directories(&dir, &dir, &dir);
        prop_assert!(result.is_clean());
        prop_assert_eq!(DirectoryAgent::decode(&result.proposed_merge).unwrap(), dir);
    }

    #[test]
    fn directory_merge_proposal_is_deterministic(
        ancestor in arb_directory(),
        source in arb_directory(),
        target in arb_directory(),
    ) {
        let first = merge_directories(&ancestor, &source, &target);
        let second = merge_directories(&ancestor, &source, &target);
        prop_assert_eq!(first.proposed_merge, second.proposed_merge);
        prop_assert_eq!(first.conflicts.len(), second.conflicts.len());
    }

    #[test]
    fn baseline_merge_is_idempotent(bl in arb_baseline()) {
        let result = merge_baselines(&bl, &bl, &bl);
        prop_assert!(result.is_clean());
        prop_assert_eq!(BaselineAgent::decode(&result.proposed_merge).unwrap(), bl);
    }

    #[test]
    fn baseline_mod_mod_conflicts_are_complete(
        ancestor in arb_baseline(),
        source in arb_baseline(),
        target in arb_baseline(),
    ) {
        let result = merge_baselines(&ancestor, &source, &target);
        let merged = BaselineAgent::decode(&result.proposed_merge).unwrap();

        let mod_mod_count = result
            .conflicts
            .iter()
            .filter(|c| matches!(
                &c.details,
                ConflictDetails::Baseline(d) if d.kind == BaselineConflictKind::ModMod
            ))
            .count();

        // Count ids divergently modified (or divergently added) in both.
        let mut expected = 0usize;
        for (id, src_v) in source.iter() {
            let Some(tgt_v) = target.get(id) else { continue };
            if src_v == tgt_v {
                continue;
            }
            match ancestor.get(id) {
                // Both modified away from the ancestor, to different versions.
                Some(anc_v) if src_v != anc_v && tgt_v != anc_v => expected += 1,
                Some(_) => {}
                // Added on both sides with different versions.
                None => expected += 1,
            }
        }
        prop_assert_eq!(mod_mod_count, expected);

        // Every divergently-modified id is absent from the proposal.
        for (id, src_v) in source.iter() {
            if let Some(tgt_v) = target.get(id) {
                let diverged = src_v != tgt_v
                    && ancestor.get(id).is_none_or(|anc_v| src_v != anc_v && tgt_v != anc_v);
                if diverged {
                    prop_assert!(!merged.contains(id));
                }
            }
        }
    }

    #[test]
    fn baseline_merge_proposal_is_deterministic(
        ancestor in arb_baseline(),
        source in arb_baseline(),
        target in arb_baseline(),
    ) {
        let first = merge_baselines(&ancestor, &source, &target);
        let second = merge_baselines(&ancestor, &source, &target);
        prop_assert_eq!(first.proposed_merge, second.proposed_merge);
    }
}
