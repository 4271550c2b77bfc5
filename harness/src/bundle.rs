//! In-memory trace bundle: the output of a harness run.
//!
//! No file I/O in this module. See [`crate::bundle_dir`] for persistence.
//!
//! # Normative vs observational artifacts
//!
//! Each artifact is tagged `normative` (participates in the bundle digest)
//! or observational (listed in the manifest, excluded from the digest).
//! `summary.txt` is observational: it is a human-readable rendering of
//! values the normative artifacts already commit to.
//!
//! The bundle digest is computed over the **digest basis**: a canonical JSON
//! projection of normative artifact hashes only.

use std::collections::BTreeMap;

use stepviz_kernel::proof::canon::{canonical_json_bytes, is_canonical};
use stepviz_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use stepviz_kernel::proof::step_chain::step_chain;

pub const STEPS_FILENAME: &str = "steps.json";
pub const FINAL_SNAPSHOT_FILENAME: &str = "final_snapshot.json";
pub const OPTIONS_FILENAME: &str = "options.json";
pub const INPUT_FILENAME: &str = "input.json";
pub const REPORT_FILENAME: &str = "run_report.json";
pub const SUMMARY_FILENAME: &str = "summary.txt";

/// Artifacts a bundle with a run report must carry.
const REPORT_BOUND_ARTIFACTS: &[&str] = &[STEPS_FILENAME, FINAL_SNAPSHOT_FILENAME, OPTIONS_FILENAME];

/// A single artifact in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Logical filename (e.g., `"steps.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `canonical_hash(BundleArtifact, content)`.
    pub content_hash: ContentHash,
    pub normative: bool,
}

/// The complete artifact bundle from a harness run.
#[derive(Debug, Clone)]
pub struct TraceBundle {
    /// Artifacts indexed by logical name, in sorted order.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    /// Canonical JSON listing all artifacts with normative flags.
    pub manifest: Vec<u8>,
    /// Canonical JSON listing normative artifact hashes only.
    pub digest_basis: Vec<u8>,
    /// `canonical_hash(BundleDigest, digest_basis)`.
    pub digest: ContentHash,
}

impl TraceBundle {
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }
}

/// Error building a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleBuildError {
    CanonError { detail: String },
}

impl std::fmt::Display for BundleBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for BundleBuildError {}

/// Build a [`TraceBundle`] from `(name, content, normative)` triples.
///
/// # Errors
///
/// Returns [`BundleBuildError`] if canonical JSON serialization fails.
pub fn build_bundle(artifacts: Vec<(String, Vec<u8>, bool)>) -> Result<TraceBundle, BundleBuildError> {
    let artifact_map: BTreeMap<String, BundleArtifact> = artifacts
        .into_iter()
        .map(|(name, content, normative)| {
            let content_hash = canonical_hash(HashDomain::BundleArtifact, &content);
            (
                name.clone(),
                BundleArtifact {
                    name,
                    content,
                    content_hash,
                    normative,
                },
            )
        })
        .collect();

    let manifest = compute_manifest_bytes(&artifact_map)
        .map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest_basis = compute_digest_basis_bytes(&artifact_map)
        .map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);

    Ok(TraceBundle {
        artifacts: artifact_map,
        manifest,
        digest_basis,
        digest,
    })
}

/// Error from bundle integrity verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleVerifyError {
    /// An artifact's stored `content_hash` does not match the recomputed hash.
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    ManifestMismatch,
    ManifestNotCanonical,
    DigestBasisMismatch,
    DigestBasisNotCanonical,
    DigestMismatch { expected: String, actual: String },
    /// A normative JSON artifact is not in canonical JSON form.
    ArtifactNotCanonical { artifact: String },
    /// `run_report.json` is present but a bound artifact is not.
    ArtifactMissing { artifact: String },
    /// An artifact is not the JSON shape the report binding expects.
    ArtifactParseError { artifact: String, detail: String },
    ReportFieldMissing { field: String },
    /// Recomputed step chain digest does not match the report.
    StepChainMismatch { declared: String, recomputed: String },
    StepCountMismatch { declared: u64, actual: u64 },
    OptionsDigestMismatch { declared: String, recomputed: String },
    FinalSnapshotDigestMismatch { declared: String, recomputed: String },
}

impl std::fmt::Display for BundleVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentHashMismatch {
                artifact,
                expected,
                actual,
            } => write!(f, "{artifact}: content hash {actual} != declared {expected}"),
            Self::ManifestMismatch => f.write_str("manifest does not match artifacts"),
            Self::ManifestNotCanonical => f.write_str("manifest is not canonical JSON"),
            Self::DigestBasisMismatch => f.write_str("digest basis does not match artifacts"),
            Self::DigestBasisNotCanonical => f.write_str("digest basis is not canonical JSON"),
            Self::DigestMismatch { expected, actual } => {
                write!(f, "bundle digest {actual} != declared {expected}")
            }
            Self::ArtifactNotCanonical { artifact } => {
                write!(f, "{artifact} is not canonical JSON")
            }
            Self::ArtifactMissing { artifact } => write!(f, "missing artifact: {artifact}"),
            Self::ArtifactParseError { artifact, detail } => write!(f, "{artifact}: {detail}"),
            Self::ReportFieldMissing { field } => write!(f, "run report missing field: {field}"),
            Self::StepChainMismatch {
                declared,
                recomputed,
            } => write!(f, "step chain {recomputed} != declared {declared}"),
            Self::StepCountMismatch { declared, actual } => {
                write!(f, "step count {actual} != declared {declared}")
            }
            Self::OptionsDigestMismatch {
                declared,
                recomputed,
            } => write!(f, "options digest {recomputed} != declared {declared}"),
            Self::FinalSnapshotDigestMismatch {
                declared,
                recomputed,
            } => write!(f, "final snapshot digest {recomputed} != declared {declared}"),
        }
    }
}

impl std::error::Error for BundleVerifyError {}

/// Verify the internal consistency of a bundle.
///
/// Proves, in order:
///
/// 1. Each artifact's `content_hash` matches its content.
/// 2. `manifest` and `digest_basis` match the projections recomputed from the
///    artifacts and are canonical JSON.
/// 3. `digest` matches `canonical_hash(BundleDigest, digest_basis)`.
/// 4. Normative `.json` artifacts are canonical.
/// 5. If `run_report.json` exists: the step chain and step count recomputed
///    from `steps.json`, the options digest and the final snapshot digest all
///    match the report.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn verify_bundle(bundle: &TraceBundle) -> Result<(), BundleVerifyError> {
    for artifact in bundle.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(BundleVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.as_str().to_string(),
                actual: recomputed.as_str().to_string(),
            });
        }
    }

    let expected_manifest = compute_manifest_bytes(&bundle.artifacts).map_err(|detail| {
        BundleVerifyError::ArtifactParseError {
            artifact: "bundle_manifest".into(),
            detail,
        }
    })?;
    if expected_manifest != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    if !is_canonical(&bundle.manifest) {
        return Err(BundleVerifyError::ManifestNotCanonical);
    }

    let expected_basis = compute_digest_basis_bytes(&bundle.artifacts).map_err(|detail| {
        BundleVerifyError::ArtifactParseError {
            artifact: "bundle_digest_basis".into(),
            detail,
        }
    })?;
    if expected_basis != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    if !is_canonical(&bundle.digest_basis) {
        return Err(BundleVerifyError::DigestBasisNotCanonical);
    }

    let recomputed_digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if recomputed_digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.as_str().to_string(),
            actual: recomputed_digest.as_str().to_string(),
        });
    }

    for artifact in bundle.artifacts.values() {
        let is_json = std::path::Path::new(&artifact.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if artifact.normative && is_json && !is_canonical(&artifact.content) {
            return Err(BundleVerifyError::ArtifactNotCanonical {
                artifact: artifact.name.clone(),
            });
        }
    }

    verify_report_bindings(bundle)
}

fn verify_report_bindings(bundle: &TraceBundle) -> Result<(), BundleVerifyError> {
    let Some(report_artifact) = bundle.artifacts.get(REPORT_FILENAME) else {
        return Ok(());
    };
    for name in REPORT_BOUND_ARTIFACTS {
        if !bundle.artifacts.contains_key(*name) {
            return Err(BundleVerifyError::ArtifactMissing {
                artifact: (*name).to_string(),
            });
        }
    }
    let report = parse_json(report_artifact)?;

    // Step chain over the canonical bytes of each step, in order.
    let steps_value = parse_json(&bundle.artifacts[STEPS_FILENAME])?;
    let steps = steps_value
        .as_array()
        .ok_or_else(|| BundleVerifyError::ArtifactParseError {
            artifact: STEPS_FILENAME.into(),
            detail: "expected an array of steps".into(),
        })?;
    let step_bytes: Vec<Vec<u8>> = steps
        .iter()
        .map(canonical_json_bytes)
        .collect::<Result<_, _>>()
        .map_err(|e| BundleVerifyError::ArtifactParseError {
            artifact: STEPS_FILENAME.into(),
            detail: e.to_string(),
        })?;

    let declared_count = report_u64(&report, "step_count")?;
    let actual_count = steps.len() as u64;
    if declared_count != actual_count {
        return Err(BundleVerifyError::StepCountMismatch {
            declared: declared_count,
            actual: actual_count,
        });
    }

    let chain = step_chain(&step_bytes).map_err(|e| BundleVerifyError::ArtifactParseError {
        artifact: STEPS_FILENAME.into(),
        detail: e.to_string(),
    })?;
    let declared_chain = report_str(&report, "step_chain_digest")?;
    if chain.digest.as_str() != declared_chain {
        return Err(BundleVerifyError::StepChainMismatch {
            declared: declared_chain.to_string(),
            recomputed: chain.digest.as_str().to_string(),
        });
    }

    let options_digest = canonical_hash(
        HashDomain::RuntimeOptions,
        &bundle.artifacts[OPTIONS_FILENAME].content,
    );
    let declared_options = report_str(&report, "options_digest")?;
    if options_digest.as_str() != declared_options {
        return Err(BundleVerifyError::OptionsDigestMismatch {
            declared: declared_options.to_string(),
            recomputed: options_digest.as_str().to_string(),
        });
    }

    let snapshot_digest = canonical_hash(
        HashDomain::Snapshot,
        &bundle.artifacts[FINAL_SNAPSHOT_FILENAME].content,
    );
    let declared_snapshot = report_str(&report, "final_snapshot_digest")?;
    if snapshot_digest.as_str() != declared_snapshot {
        return Err(BundleVerifyError::FinalSnapshotDigestMismatch {
            declared: declared_snapshot.to_string(),
            recomputed: snapshot_digest.as_str().to_string(),
        });
    }

    Ok(())
}

fn parse_json(artifact: &BundleArtifact) -> Result<serde_json::Value, BundleVerifyError> {
    serde_json::from_slice(&artifact.content).map_err(|e| BundleVerifyError::ArtifactParseError {
        artifact: artifact.name.clone(),
        detail: e.to_string(),
    })
}

fn report_str<'r>(report: &'r serde_json::Value, field: &str) -> Result<&'r str, BundleVerifyError> {
    report[field]
        .as_str()
        .ok_or_else(|| BundleVerifyError::ReportFieldMissing {
            field: field.to_string(),
        })
}

fn report_u64(report: &serde_json::Value, field: &str) -> Result<u64, BundleVerifyError> {
    report[field]
        .as_u64()
        .ok_or_else(|| BundleVerifyError::ReportFieldMissing {
            field: field.to_string(),
        })
}

/// Recompute manifest bytes from the artifact map.
pub(crate) fn compute_manifest_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
) -> Result<Vec<u8>, String> {
    let listed: Vec<serde_json::Value> = artifacts
        .values()
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })
        })
        .collect();
    let manifest = serde_json::json!({
        "artifacts": listed,
        "schema_version": "stepviz_bundle.v1",
    });
    canonical_json_bytes(&manifest).map_err(|e| e.to_string())
}

/// Recompute digest basis bytes from normative artifacts only.
fn compute_digest_basis_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
) -> Result<Vec<u8>, String> {
    let normative: Vec<serde_json::Value> = artifacts
        .values()
        .filter(|a| a.normative)
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
            })
        })
        .collect();
    let basis = serde_json::json!({
        "artifacts": normative,
        "schema_version": "stepviz_digest_basis.v1",
    });
    canonical_json_bytes(&basis).map_err(|e| e.to_string())
}
