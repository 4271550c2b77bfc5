//! Bundle directory persistence.
//!
//! Proves:
//! 1. Adapter runs written to disk read back and verify with the same digest
//! 2. A flipped artifact byte fails closed with a content hash mismatch
//! 3. Extra, missing, or rewritten metadata files are rejected
//! 4. The observational summary is stored but excluded from the digest

use std::fs;

use stepviz_harness::bundle::{BundleVerifyError, TraceBundle, STEPS_FILENAME, SUMMARY_FILENAME};
use stepviz_harness::bundle_dir::{
    read_bundle_dir, verify_bundle_dir, write_bundle_dir, BundleDirReadError, BundleDirVerifyError,
};
use stepviz_harness::contract::ProblemAdapter;
use stepviz_harness::runner::run_adapter;
use stepviz_harness::worlds::n_queens::{NQueensAdapter, NQueensInput};
use stepviz_harness::worlds::permutations::PermutationsAdapter;

fn queens_bundle() -> TraceBundle {
    let input = NQueensInput {
        n: 5,
        stop_after_first: false,
        ..NQueensInput::default()
    };
    run_adapter(&NQueensAdapter, &input).unwrap().1
}

#[test]
fn adapter_bundles_round_trip() {
    let permutations = PermutationsAdapter;
    let bundles = [
        queens_bundle(),
        run_adapter(&permutations, &permutations.default_input()).unwrap().1,
    ];
    for bundle in bundles {
        let dir = tempfile::tempdir().unwrap();
        write_bundle_dir(&bundle, dir.path()).unwrap();
        let loaded = verify_bundle_dir(dir.path()).unwrap();
        assert_eq!(loaded.digest, bundle.digest);
        assert_eq!(loaded.manifest, bundle.manifest);
        assert_eq!(
            loaded.artifacts.keys().collect::<Vec<_>>(),
            bundle.artifacts.keys().collect::<Vec<_>>()
        );
    }
}

#[test]
fn rewriting_a_bundle_is_idempotent() {
    let bundle = queens_bundle();
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    assert_eq!(read_bundle_dir(dir.path()).unwrap().digest, bundle.digest);
}

#[test]
fn flipped_step_byte_fails_verification() {
    let bundle = queens_bundle();
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();

    let path = dir.path().join(STEPS_FILENAME);
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 2;
    bytes[last] ^= 0x01;
    fs::write(&path, bytes).unwrap();

    let err = verify_bundle_dir(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            BundleDirVerifyError::VerifyError(BundleVerifyError::ContentHashMismatch { ref artifact, .. })
                if artifact == STEPS_FILENAME
        ),
        "got {err}"
    );
}

#[test]
fn stray_file_is_rejected() {
    let bundle = queens_bundle();
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let err = read_bundle_dir(dir.path()).unwrap_err();
    assert!(
        matches!(err, BundleDirReadError::ExtraFile { ref name } if name == "notes.txt"),
        "got {err}"
    );
}

#[test]
fn missing_artifact_is_rejected() {
    let bundle = queens_bundle();
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    fs::remove_file(dir.path().join(STEPS_FILENAME)).unwrap();

    let err = read_bundle_dir(dir.path()).unwrap_err();
    assert!(
        matches!(err, BundleDirReadError::MissingArtifact { ref name } if name == STEPS_FILENAME),
        "got {err}"
    );
}

#[test]
fn summary_edit_is_detected_but_not_digested() {
    let bundle = queens_bundle();
    assert!(!bundle.artifact(SUMMARY_FILENAME).unwrap().normative);
    let basis = String::from_utf8(bundle.digest_basis.clone()).unwrap();
    assert!(!basis.contains(SUMMARY_FILENAME));
    assert!(basis.contains(STEPS_FILENAME));

    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    fs::write(dir.path().join(SUMMARY_FILENAME), b"edited\n").unwrap();

    // Content hashes still cover observational artifacts.
    let err = verify_bundle_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        BundleDirVerifyError::VerifyError(BundleVerifyError::ContentHashMismatch { .. })
    ));
}

#[test]
fn rewritten_digest_file_is_rejected() {
    let bundle = queens_bundle();
    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&bundle, dir.path()).unwrap();
    fs::write(
        dir.path().join("bundle_digest.txt"),
        format!("sha256:{}", "0".repeat(64)),
    )
    .unwrap();

    let err = read_bundle_dir(dir.path()).unwrap_err();
    assert!(matches!(err, BundleDirReadError::DigestMismatch { .. }), "got {err}");
}
