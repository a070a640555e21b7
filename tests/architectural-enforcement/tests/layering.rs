//! Integration Test: Layering
//!
//! The conversation core is headless: it knows nothing about terminals,
//! command lines or log subscribers. Presentation crates reach the network
//! only through the core's transport.

use std::fs;

use architectural_enforcement::{
    code_part, fail_on, is_test_code, rust_sources, workspace_root, PRODUCTION_DIRS,
};

/// Crates the core must never depend on
const CORE_FORBIDDEN_DEPS: &[&str] = &[
    "ratatui",
    "crossterm",
    "clap",
    "tracing-subscriber",
    "anyhow",
];

/// Names from `[dependencies]` of a manifest
fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_deps = false;
    let mut names = Vec::new();
    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line == "[dependencies]";
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

/// Crates only the WebSocket transport uses; they stay behind its feature
const CORE_WEBSOCKET_DEPS: &[&str] = &["tokio-tungstenite", "futures"];

#[test]
fn test_websocket_deps_are_optional() {
    let manifest = fs::read_to_string(workspace_root().join("databot/core/Cargo.toml"))
        .expect("core manifest");

    let violations: Vec<String> = CORE_WEBSOCKET_DEPS
        .iter()
        .filter(|dep| {
            !manifest.lines().any(|line| {
                line.trim().starts_with(&format!("{dep} ")) && line.contains("optional = true")
            })
        })
        .map(|dep| format!("databot/core/Cargo.toml - {dep} is not optional"))
        .collect();

    fail_on(
        &violations,
        "CRITICAL: A WebSocket-only crate is a required core dependency!",
        &["Mark it `optional = true` and list it under the `websocket` feature."],
    );
}

#[test]
fn test_core_manifest_is_headless() {
    let manifest = fs::read_to_string(workspace_root().join("databot/core/Cargo.toml"))
        .expect("core manifest");
    let deps = dependency_names(&manifest);

    let violations: Vec<String> = deps
        .iter()
        .filter(|d| CORE_FORBIDDEN_DEPS.contains(&d.as_str()))
        .map(|d| format!("databot/core/Cargo.toml - forbidden dependency: {d}"))
        .collect();

    assert!(deps.iter().any(|d| d == "tokio"), "manifest was not parsed");
    fail_on(
        &violations,
        "CRITICAL: The core depends on a presentation crate!",
        &["Move terminal, CLI and subscriber code into a binary crate."],
    );
}

#[test]
fn test_core_sources_are_headless() {
    let mut violations = Vec::new();
    for file in rust_sources("databot/core/src") {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            if code.contains("ratatui::") || code.contains("crossterm::") {
                violations.push(file.violation(idx, "Terminal code in core", line));
            }
            let in_websocket_module = file.path.ends_with("transport/websocket.rs");
            if code.contains("tokio_tungstenite") && !in_websocket_module && !is_test_code(&lines, idx)
            {
                violations.push(file.violation(idx, "Socket code outside the transport", line));
            }
        }
    }

    fail_on(
        &violations,
        "CRITICAL: Presentation or socket code leaked into the core!",
        &["The engine talks to the UI through PresentationSurface and to the network through Transport."],
    );
}

#[test]
fn test_tui_uses_core_transport() {
    let mut violations = Vec::new();
    for file in rust_sources("tui/src") {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            if code.contains("tokio_tungstenite") || code.contains("TransportEvent") {
                violations.push(file.violation(idx, "TUI bypasses the engine", line));
            }
            if !is_test_code(&lines, idx) && code.contains("databot_core::format") {
                violations.push(file.violation(idx, "TUI formats replies itself", line));
            }
        }
    }

    fail_on(
        &violations,
        "CRITICAL: The TUI reaches past the conversation engine!",
        &["Submit through the engine and draw what it appends to the surface."],
    );
}

#[test]
fn test_no_unwrap_in_production_code() {
    let mut violations = Vec::new();
    for file in PRODUCTION_DIRS.iter().flat_map(|dir| rust_sources(dir)) {
        let lines = file.lines();
        for (idx, line) in lines.iter().enumerate() {
            let code = code_part(line);
            if (code.contains(".unwrap()") || code.contains(".expect(")) && !is_test_code(&lines, idx)
            {
                violations.push(file.violation(idx, "Panicking unwrap", line));
            }
        }
    }

    fail_on(
        &violations,
        "CRITICAL: unwrap()/expect() in production code!",
        &["Propagate with `?` and a thiserror/anyhow error instead."],
    );
}
