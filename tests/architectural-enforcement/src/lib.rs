//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No blocking I/O inside async functions
//! - No sleep() calls in production code
//! - The conversation core stays headless (no terminal or CLI crates)
//! - No unwrap()/expect() in production code
//!
//! The helpers here do a line-based scan of the workspace sources. They are
//! deliberately simple: a declaration is found by scanning upwards, and
//! everything after a `#[cfg(test)]` line counts as test code.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["databot/core/src", "databot/devserver/src", "tui/src"];

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// One Rust source file, split into lines
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// File content
    pub content: String,
}

impl SourceFile {
    /// Lines of the file
    pub fn lines(&self) -> Vec<&str> {
        self.content.lines().collect()
    }

    /// Format a violation for this file
    pub fn violation(&self, idx: usize, what: &str, line: &str) -> String {
        format!("{}:{} - {}: {}", self.path.display(), idx + 1, what, line.trim())
    }
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    if !base.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| {
            let content = fs::read_to_string(e.path()).ok()?;
            let path = e.path().strip_prefix(&root).unwrap_or(e.path()).to_path_buf();
            Some(SourceFile { path, content })
        })
        .collect()
}

/// The part of a line before any `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Kind of function declared on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// `fn`
    Sync,
    /// `async fn`
    Async,
}

/// Whether `line` declares a function, and which kind
///
/// Handles visibility (`pub`, `pub(crate)`, `pub(super)`) and the
/// `const`/`unsafe` qualifiers.
pub fn fn_declaration(line: &str) -> Option<FnKind> {
    let mut rest = line.trim_start();
    for visibility in ["pub(crate) ", "pub(super) ", "pub "] {
        if let Some(r) = rest.strip_prefix(visibility) {
            rest = r;
            break;
        }
    }
    for qualifier in ["const ", "unsafe "] {
        rest = rest.strip_prefix(qualifier).unwrap_or(rest);
    }

    if rest.starts_with("async fn ") {
        Some(FnKind::Async)
    } else if rest.starts_with("fn ") {
        Some(FnKind::Sync)
    } else {
        None
    }
}

/// Kind of the nearest function declared at or above `idx`
pub fn enclosing_fn(lines: &[&str], idx: usize) -> Option<FnKind> {
    lines[..=idx].iter().rev().find_map(|l| fn_declaration(l))
}

/// Whether `idx` is test code: below a `#[cfg(test)]` line, or inside a
/// function marked `#[test]`/`#[tokio::test]`
pub fn is_test_code(lines: &[&str], idx: usize) -> bool {
    if lines[..=idx]
        .iter()
        .any(|l| l.trim_start().starts_with("#[cfg(test)]"))
    {
        return true;
    }

    let Some(fn_idx) = (0..=idx).rev().find(|&i| fn_declaration(lines[i]).is_some()) else {
        return false;
    };
    for line in lines[..fn_idx].iter().rev() {
        let line = line.trim();
        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }
        if !line.starts_with("#[") && !line.starts_with("///") {
            break;
        }
    }
    false
}

/// Report violations to stderr and panic if there are any
pub fn fail_on(violations: &[String], headline: &str, guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {headline}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in guidance {
        eprintln!("  {line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_declaration_variants() {
        assert_eq!(fn_declaration("fn main() {"), Some(FnKind::Sync));
        assert_eq!(fn_declaration("    pub fn load() {"), Some(FnKind::Sync));
        assert_eq!(fn_declaration("pub(crate) fn x() {"), Some(FnKind::Sync));
        assert_eq!(fn_declaration("    pub async fn run(&mut self) {"), Some(FnKind::Async));
        assert_eq!(fn_declaration("async fn handle() {"), Some(FnKind::Async));
        assert_eq!(fn_declaration("    let f = fn_ptr;"), None);
        assert_eq!(fn_declaration("// fn commented"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let code = [
            "pub async fn bad() {",
            "    let s = std::fs::read_to_string(\"x\");",
            "}",
            "fn fine() {",
            "    let s = std::fs::read_to_string(\"x\");",
            "}",
        ];
        assert_eq!(enclosing_fn(&code, 1), Some(FnKind::Async));
        assert_eq!(enclosing_fn(&code, 4), Some(FnKind::Sync));
        assert_eq!(enclosing_fn(&["use std::fs;"], 0), None);
    }

    #[test]
    fn test_test_code_detection() {
        let code = [
            "fn prod() {}",
            "#[tokio::test]",
            "async fn test_it() {",
            "    std::fs::read(\"x\");",
            "}",
            "fn helper() {}",
            "#[cfg(test)]",
            "mod tests {",
            "    fn in_tests() {}",
            "}",
        ];
        assert!(!is_test_code(&code, 0));
        assert!(is_test_code(&code, 3));
        assert!(!is_test_code(&code, 5));
        assert!(is_test_code(&code, 8));
    }
}
