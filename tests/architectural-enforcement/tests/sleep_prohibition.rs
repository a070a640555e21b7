//! Integration Test: Sleep Prohibition
//!
//! **Policy**: production code MUST NOT sleep. Wait on I/O, a channel, or
//! `tokio::time::interval` / `tokio::time::timeout` instead.

use architectural_enforcement::{code_part, fail_on, is_test_code, rust_sources, PRODUCTION_DIRS};

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for file in PRODUCTION_DIRS.iter().flat_map(|dir| rust_sources(dir)) {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            if (code.contains("::sleep(") || code.contains(".sleep(")) && !is_test_code(&lines, idx)
            {
                violations.push(file.violation(idx, "Sleep call", line));
            }
        }
    }

    fail_on(
        &violations,
        "CRITICAL: Sleep calls found in production code!",
        &[
            "✅ ACCEPTABLE:",
            "  - tokio::time::interval() for periodic redraws",
            "  - tokio::time::timeout() around a single await",
            "  - Test code",
        ],
    );
}
