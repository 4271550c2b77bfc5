//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. The domain set has the expected size (catches forgotten additions to ALL)
//! 2. Domain byte strings are unique
//! 3. Domains are null-terminated
//! 4. Domains follow the `STEPVIZ::*::V1\0` naming convention
//! 5. No raw `STEPVIZ::` domain literals in production source outside `hash.rs`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use stepviz_kernel::proof::hash::HashDomain;

const PRODUCTION_DIRS: [&str; 3] = [
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
];

#[test]
fn domain_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        6,
        "expected 6 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn domain_bytes_unique() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(seen.insert(domain.as_bytes()), "duplicate domain bytes: {domain}");
    }
}

#[test]
fn domains_null_terminated() {
    for domain in HashDomain::ALL {
        assert!(domain.as_bytes().ends_with(&[0]), "{domain} is not null-terminated");
    }
}

#[test]
fn domains_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"STEPVIZ::"), "{domain} does not start with STEPVIZ::");
        assert!(bytes.ends_with(b"::V1\0"), "{domain} does not end with ::V1\\0");
    }
}

#[test]
fn production_dirs_exist() {
    for dir in PRODUCTION_DIRS {
        assert!(Path::new(dir).is_dir(), "missing source dir {dir}");
    }
}

/// The only file allowed to spell out domain bytes is `hash.rs`.
#[test]
fn no_raw_domain_literals_outside_authority() {
    let pattern = "b\"STEPVIZ::";
    let authority_file = "hash.rs";
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        for path in walk(Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(authority_file) {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            scan_source(&path, &content, pattern, &mut violations);
        }
    }

    assert!(
        violations.is_empty(),
        "raw STEPVIZ:: domain literals found outside {authority_file}:\n{}",
        violations.join("\n")
    );
}

/// Flags `pattern` on non-comment lines, skipping `#[cfg(test)]` blocks by
/// brace depth.
fn scan_source(path: &Path, content: &str, pattern: &str, violations: &mut Vec<String>) {
    let mut brace_depth: usize = 0;
    let mut skip_depth: Option<usize> = None;
    let mut cfg_test_pending = false;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            cfg_test_pending = true;
            continue;
        }

        let opens = line.chars().filter(|&c| c == '{').count();
        let closes = line.chars().filter(|&c| c == '}').count();
        if cfg_test_pending && opens > 0 {
            skip_depth = Some(brace_depth);
            cfg_test_pending = false;
        }
        brace_depth = brace_depth.saturating_add(opens).saturating_sub(closes);

        if let Some(depth) = skip_depth {
            if brace_depth <= depth {
                skip_depth = None;
            }
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        if trimmed.contains(pattern) {
            violations.push(format!("  {}:{}: {}", path.display(), i + 1, trimmed));
        }
    }
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                results.extend(walk(&path));
            } else {
                results.push(path);
            }
        }
    }
    results
}
