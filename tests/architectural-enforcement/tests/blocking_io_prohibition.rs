//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions in production code MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::net`, `tokio::process` in async code.
//!
//! Blocking calls are acceptable in synchronous functions that run before
//! the event loop (config loading, log file setup) and in tests.

use architectural_enforcement::{
    code_part, enclosing_fn, fail_on, is_test_code, rust_sources, FnKind, SourceFile,
    PRODUCTION_DIRS,
};

/// Blocking calls and what they block on
const FORBIDDEN: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("File::open(", "Blocking file I/O"),
    ("File::create(", "Blocking file I/O"),
    ("std::net::TcpStream", "Blocking network I/O"),
    ("std::net::TcpListener", "Blocking network I/O"),
    ("std::net::UdpSocket", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("std::thread::sleep", "Blocking sleep"),
    ("std::io::stdin()", "Blocking stdin"),
];

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations: Vec<String> = PRODUCTION_DIRS
        .iter()
        .flat_map(|dir| rust_sources(dir))
        .flat_map(|file| violations_in(&file))
        .collect();

    fail_on(
        &violations,
        "CRITICAL: Blocking I/O calls found in async code!",
        &[
            "✅ REQUIRED async I/O:",
            "  - tokio::fs::read().await, tokio::net::TcpStream::connect().await",
            "✅ ACCEPTABLE blocking I/O:",
            "  - Non-async functions that run before the event loop",
            "  - Test code",
        ],
    );
}

fn violations_in(file: &SourceFile) -> Vec<String> {
    let lines = file.lines();
    let mut violations = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line);
        if is_test_code(&lines, idx) || enclosing_fn(&lines, idx) != Some(FnKind::Async) {
            continue;
        }
        for (pattern, what) in FORBIDDEN {
            if code.contains(pattern) {
                violations.push(file.violation(idx, what, line));
            }
        }
    }
    violations
}
