//! Bundle directory persistence: write/read/verify a [`TraceBundle`] on disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   bundle_manifest.json       canonical JSON, full artifact listing
//!   bundle_digest_basis.json   canonical JSON, normative projection only
//!   bundle_digest.txt          "sha256:<hex>"
//!   steps.json                 one file per artifact
//!   ...
//! ```
//!
//! The directory path is never hashed. The manifest's list is the source of
//! truth for which files must exist.
//!
//! # Fail-closed semantics
//!
//! Missing declared files, undeclared extra files, an unknown manifest
//! schema, and a stored digest that disagrees with the digest basis are all
//! errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use stepviz_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::bundle::{verify_bundle, BundleArtifact, BundleVerifyError, TraceBundle};

const MANIFEST_FILENAME: &str = "bundle_manifest.json";
const DIGEST_BASIS_FILENAME: &str = "bundle_digest_basis.json";
const DIGEST_FILENAME: &str = "bundle_digest.txt";
const MANIFEST_SCHEMA: &str = "stepviz_bundle.v1";
const TEMP_PREFIX: &str = ".tmp_";

const METADATA_FILENAMES: &[&str] = &[MANIFEST_FILENAME, DIGEST_BASIS_FILENAME, DIGEST_FILENAME];

/// Error writing a bundle directory.
#[derive(Debug)]
pub enum BundleDirWriteError {
    Io { detail: String },
}

impl std::fmt::Display for BundleDirWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
        }
    }
}

impl std::error::Error for BundleDirWriteError {}

/// Error reading a bundle directory.
#[derive(Debug)]
pub enum BundleDirReadError {
    Io { detail: String },
    MissingMetadata { filename: String },
    MissingArtifact { name: String },
    /// An undeclared file exists in the directory.
    ExtraFile { name: String },
    ManifestParseError { detail: String },
    ManifestVersionMismatch { found: String },
    ManifestEntryInvalid { detail: String },
    /// `bundle_digest.txt` disagrees with the recomputed digest.
    DigestMismatch { stored: String, recomputed: String },
}

impl std::fmt::Display for BundleDirReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingMetadata { filename } => write!(f, "missing metadata file: {filename}"),
            Self::MissingArtifact { name } => write!(f, "missing artifact: {name}"),
            Self::ExtraFile { name } => write!(f, "undeclared extra file: {name}"),
            Self::ManifestParseError { detail } => write!(f, "manifest parse error: {detail}"),
            Self::ManifestVersionMismatch { found } => {
                write!(f, "manifest version mismatch: {found}")
            }
            Self::ManifestEntryInvalid { detail } => write!(f, "manifest entry invalid: {detail}"),
            Self::DigestMismatch { stored, recomputed } => {
                write!(f, "digest mismatch: stored={stored}, recomputed={recomputed}")
            }
        }
    }
}

impl std::error::Error for BundleDirReadError {}

/// Error verifying a bundle directory.
#[derive(Debug)]
pub enum BundleDirVerifyError {
    ReadError(BundleDirReadError),
    VerifyError(BundleVerifyError),
}

impl std::fmt::Display for BundleDirVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadError(e) => write!(f, "read error: {e}"),
            Self::VerifyError(e) => write!(f, "verify error: {e}"),
        }
    }
}

impl std::error::Error for BundleDirVerifyError {}

/// Write `bundle` into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`BundleDirWriteError`] on I/O failure.
pub fn write_bundle_dir(bundle: &TraceBundle, dir: &Path) -> Result<(), BundleDirWriteError> {
    std::fs::create_dir_all(dir).map_err(|e| BundleDirWriteError::Io {
        detail: format!("create_dir_all {}: {e}", dir.display()),
    })?;

    for artifact in bundle.artifacts.values() {
        write_atomic(&dir.join(&artifact.name), &artifact.content)?;
    }
    write_atomic(&dir.join(MANIFEST_FILENAME), &bundle.manifest)?;
    write_atomic(&dir.join(DIGEST_BASIS_FILENAME), &bundle.digest_basis)?;
    write_atomic(&dir.join(DIGEST_FILENAME), bundle.digest.as_str().as_bytes())?;
    Ok(())
}

/// Read a bundle directory written by [`write_bundle_dir`].
///
/// # Errors
///
/// Returns [`BundleDirReadError`] on any validation failure.
pub fn read_bundle_dir(dir: &Path) -> Result<TraceBundle, BundleDirReadError> {
    let manifest_bytes = read_required(dir, MANIFEST_FILENAME)?;
    let digest_basis_bytes = read_required(dir, DIGEST_BASIS_FILENAME)?;
    let digest_bytes = read_required(dir, DIGEST_FILENAME)?;

    let manifest: serde_json::Value = serde_json::from_slice(&manifest_bytes).map_err(|e| {
        BundleDirReadError::ManifestParseError {
            detail: e.to_string(),
        }
    })?;

    let schema_version = manifest["schema_version"].as_str().unwrap_or("");
    if schema_version != MANIFEST_SCHEMA {
        return Err(BundleDirReadError::ManifestVersionMismatch {
            found: schema_version.to_string(),
        });
    }

    let entries = manifest["artifacts"]
        .as_array()
        .ok_or_else(|| BundleDirReadError::ManifestParseError {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut artifacts = BTreeMap::new();
    for entry in entries {
        let artifact = read_entry(dir, entry)?;
        artifacts.insert(artifact.name.clone(), artifact);
    }

    for filename in list_files(dir)? {
        if !artifacts.contains_key(&filename) && !METADATA_FILENAMES.contains(&filename.as_str()) {
            return Err(BundleDirReadError::ExtraFile { name: filename });
        }
    }

    let recomputed = canonical_hash(HashDomain::BundleDigest, &digest_basis_bytes);
    let stored = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    if recomputed.as_str() != stored {
        return Err(BundleDirReadError::DigestMismatch {
            stored,
            recomputed: recomputed.as_str().to_string(),
        });
    }

    Ok(TraceBundle {
        artifacts,
        manifest: manifest_bytes,
        digest_basis: digest_basis_bytes,
        digest: recomputed,
    })
}

/// Read a bundle directory, then run [`verify_bundle`]. The offline
/// verification entry point.
///
/// # Errors
///
/// Returns [`BundleDirVerifyError`] on read failure or integrity mismatch.
pub fn verify_bundle_dir(dir: &Path) -> Result<TraceBundle, BundleDirVerifyError> {
    let bundle = read_bundle_dir(dir).map_err(BundleDirVerifyError::ReadError)?;
    verify_bundle(&bundle).map_err(BundleDirVerifyError::VerifyError)?;
    Ok(bundle)
}

fn read_entry(dir: &Path, entry: &serde_json::Value) -> Result<BundleArtifact, BundleDirReadError> {
    let name = entry["name"]
        .as_str()
        .ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: "missing \"name\" field".into(),
        })?
        .to_string();
    if name.contains(['/', '\\']) || METADATA_FILENAMES.contains(&name.as_str()) {
        return Err(BundleDirReadError::ManifestEntryInvalid {
            detail: format!("illegal artifact name: {name}"),
        });
    }

    let hash_str = entry["content_hash"].as_str().ok_or_else(|| {
        BundleDirReadError::ManifestEntryInvalid {
            detail: format!("missing \"content_hash\" for {name}"),
        }
    })?;
    let content_hash =
        ContentHash::parse(hash_str).ok_or_else(|| BundleDirReadError::ManifestEntryInvalid {
            detail: format!("invalid content_hash for {name}: {hash_str}"),
        })?;
    let normative = entry["normative"].as_bool().ok_or_else(|| {
        BundleDirReadError::ManifestEntryInvalid {
            detail: format!("missing \"normative\" for {name}"),
        }
    })?;

    let content = std::fs::read(dir.join(&name))
        .map_err(|_| BundleDirReadError::MissingArtifact { name: name.clone() })?;

    Ok(BundleArtifact {
        name,
        content,
        content_hash,
        normative,
    })
}

/// Write via temp file + rename so readers never see a half-written file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BundleDirWriteError> {
    let dir = path.parent().ok_or_else(|| BundleDirWriteError::Io {
        detail: format!("no parent directory for {}", path.display()),
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(format!("{TEMP_PREFIX}{file_name}"));

    std::fs::write(&temp_path, content).map_err(|e| BundleDirWriteError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| BundleDirWriteError::Io {
        detail: format!("rename {} -> {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, BundleDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirReadError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, skipping leftover temp files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirReadError> {
    let io = |e: std::io::Error| BundleDirReadError::Io {
        detail: format!("read_dir {}: {e}", dir.display()),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let entry = entry.map_err(io)?;
        if !entry.file_type().map_err(io)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(TEMP_PREFIX) {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
