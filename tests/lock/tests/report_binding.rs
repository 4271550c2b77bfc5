//! Run report bindings.
//!
//! Every negative case rebuilds the bundle through `build_bundle`, so content
//! hashes and the digest stay self-consistent and only the semantic check
//! between `run_report.json` and the other artifacts can fire.

use lock_tests::bundle_test_helpers::{
    rebuild_with_modified_json, rebuild_with_report_field, rebuild_without_artifact,
};
use stepviz_harness::bundle::{
    verify_bundle, BundleVerifyError, TraceBundle, FINAL_SNAPSHOT_FILENAME, OPTIONS_FILENAME,
    REPORT_FILENAME, STEPS_FILENAME,
};
use stepviz_harness::contract::ProblemAdapter;
use stepviz_harness::runner::run_adapter;
use stepviz_harness::worlds::permutations::PermutationsAdapter;

fn bundle() -> TraceBundle {
    let adapter = PermutationsAdapter;
    let (_, bundle) = run_adapter(&adapter, &adapter.default_input()).unwrap();
    verify_bundle(&bundle).unwrap();
    bundle
}

#[test]
fn edited_step_breaks_chain() {
    let forged = rebuild_with_modified_json(&bundle(), STEPS_FILENAME, |steps| {
        steps[0]["title"] = serde_json::json!("Forged");
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::StepChainMismatch { .. })
    ));
}

#[test]
fn declared_chain_must_match() {
    let forged = rebuild_with_report_field(
        &bundle(),
        "step_chain_digest",
        serde_json::json!(format!("sha256:{}", "a".repeat(64))),
    );
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::StepChainMismatch { .. })
    ));
}

#[test]
fn declared_step_count_must_match() {
    let forged = rebuild_with_report_field(&bundle(), "step_count", serde_json::json!(1));
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::StepCountMismatch { declared: 1, .. })
    ));
}

#[test]
fn edited_options_break_options_digest() {
    let forged = rebuild_with_modified_json(&bundle(), OPTIONS_FILENAME, |options| {
        options["max_steps"] = serde_json::json!(999_999);
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::OptionsDigestMismatch { .. })
    ));
}

#[test]
fn edited_final_snapshot_breaks_snapshot_digest() {
    let forged = rebuild_with_modified_json(&bundle(), FINAL_SNAPSHOT_FILENAME, |snapshot| {
        snapshot["pruned"] = serde_json::json!(0);
        snapshot["solutions"] = serde_json::json!([]);
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::FinalSnapshotDigestMismatch { .. })
    ));
}

#[test]
fn report_requires_bound_artifacts() {
    for name in [STEPS_FILENAME, OPTIONS_FILENAME, FINAL_SNAPSHOT_FILENAME] {
        let forged = rebuild_without_artifact(&bundle(), name);
        match verify_bundle(&forged) {
            Err(BundleVerifyError::ArtifactMissing { artifact }) => assert_eq!(artifact, name),
            other => panic!("{name}: expected ArtifactMissing, got {other:?}"),
        }
    }
}

#[test]
fn bundle_without_report_skips_bindings() {
    let plain = rebuild_without_artifact(&bundle(), REPORT_FILENAME);
    verify_bundle(&plain).unwrap();
}

#[test]
fn report_without_chain_field_is_rejected() {
    let forged = rebuild_with_modified_json(&bundle(), REPORT_FILENAME, |report| {
        report
            .as_object_mut()
            .unwrap()
            .remove("step_chain_digest");
    });
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::ReportFieldMissing { ref field }) if field == "step_chain_digest"
    ));
}
