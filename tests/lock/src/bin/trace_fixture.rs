//! Runs every canonical scenario and prints deterministic `key=value` lines
//! for cross-process comparison.
//!
//! Usage: `trace_fixture`

use lock_tests::canonical_runs::{canonical_run, fingerprint_lines, CANONICAL_RUN_NAMES};

fn main() {
    for name in CANONICAL_RUN_NAMES {
        let result = canonical_run(name);
        for line in fingerprint_lines(name, &result) {
            println!("{line}");
        }
    }
}
