//! Shared helpers for architecture tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root: two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .expect("architecture-tests lives under crates/")
}

/// Every `.rs` file below `dir`, skipping build output and this crate.
pub fn rust_files(dir: &Path) -> Vec<(PathBuf, String)> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != "target" && name != "architecture-tests"
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| {
            let content = fs::read_to_string(e.path()).unwrap_or_default();
            (e.path().to_path_buf(), content)
        })
        .collect()
}

/// Whether `path` holds only tests (a `tests/` directory or a `*_tests.rs` file).
#[allow(dead_code)]
pub fn is_test_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    path_str.contains("/tests/") || path_str.ends_with("_tests.rs")
}

/// `content` with any trailing `#[cfg(test)]` module cut off.
#[allow(dead_code)]
pub fn non_test_code(content: &str) -> &str {
    content
        .find("#[cfg(test)]")
        .map_or(content, |idx| &content[..idx])
}
