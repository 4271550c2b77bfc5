//! Cross-process determinism.
//!
//! Spawns the `trace_fixture` binary under several environment variants and
//! asserts identical output, then checks that output against the same
//! fingerprints computed in this process. Proves that trace serialization and
//! step chain hashing do not depend on cwd, locale, or unrelated env vars.

use std::path::Path;
use std::process::Command;

use lock_tests::canonical_runs::{canonical_run, fingerprint_lines, CANONICAL_RUN_NAMES};

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = env!("CARGO_BIN_EXE_trace_fixture");
    let mut command = Command::new(bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "trace_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_three_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);
    assert!(baseline.contains("queens4_all.step_chain_final=sha256:"));

    let alt_cwd = std::env::temp_dir();
    let alt_cwd = alt_cwd.to_string_lossy();
    assert_eq!(
        baseline,
        run_variant(&alt_cwd, &[]),
        "output differs when cwd changes to {alt_cwd}"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs under LC_ALL=C"
    );
    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("LC_ALL", "tr_TR.UTF-8"),
                ("STEPVIZ_NOISE", "1"),
                ("RUST_LOG", "trace"),
            ]
        ),
        "output differs with noisy env"
    );
}

#[test]
fn crossproc_matches_in_process() {
    let spawned = run_variant(&workspace_root(), &[]);
    let mut expected = String::new();
    for name in CANONICAL_RUN_NAMES {
        for line in fingerprint_lines(name, &canonical_run(name)) {
            expected.push_str(&line);
            expected.push('\n');
        }
    }
    assert_eq!(spawned, expected);
}
