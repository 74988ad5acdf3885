//! Architectural Enforcement Helpers
//!
//! Source scanning shared by the enforcement tests in `tests/`. The scanner
//! is line based and deliberately simple: it knows where a file's test
//! module starts and whether a line sits inside an `async fn`, which is all
//! the policies need.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["exhibit/core/src", "exhibit/daemon/src"];

/// Workspace root (two levels above this crate)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Kind of function enclosing a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enclosing {
    /// Inside an `async fn` (or an `async move` block within one)
    Async,
    /// Inside a plain `fn`
    Sync,
    /// Module level
    None,
}

/// A loaded source file
#[derive(Debug)]
pub struct SourceFile {
    /// File path
    pub path: PathBuf,
    /// File lines
    pub lines: Vec<String>,
    /// Index of the `#[cfg(test)]` line, if any
    test_start: Option<usize>,
}

impl SourceFile {
    /// Read a source file
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_source(path, &content))
    }

    /// Build from in-memory source
    #[must_use]
    pub fn from_source(path: &Path, content: &str) -> Self {
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let test_start = lines
            .iter()
            .position(|line| line.trim_start().starts_with("#[cfg(test)]"));
        Self {
            path: path.to_path_buf(),
            lines,
            test_start,
        }
    }

    /// Whether line `idx` belongs to the test module
    #[must_use]
    pub fn is_test_code(&self, idx: usize) -> bool {
        self.test_start.is_some_and(|start| idx >= start)
    }

    /// Code part of line `idx` (line comments stripped)
    #[must_use]
    pub fn code(&self, idx: usize) -> &str {
        let line = &self.lines[idx];
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") {
            return "";
        }
        line.split(" //").next().unwrap_or(line)
    }

    /// Kind of function enclosing line `idx`
    #[must_use]
    pub fn enclosing(&self, idx: usize) -> Enclosing {
        for line in self.lines[..=idx].iter().rev() {
            let line = line.trim();
            if line.contains("async fn ") || line.contains("async move") {
                return Enclosing::Async;
            }
            if is_fn_header(line) {
                return Enclosing::Sync;
            }
            if line.starts_with("mod ") || (line.starts_with("impl") && line.ends_with('{')) {
                return Enclosing::None;
            }
        }
        Enclosing::None
    }

    /// Production (non-test) line indices with their code part
    pub fn production_lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        (0..self.lines.len())
            .filter(move |idx| !self.is_test_code(*idx))
            .map(move |idx| (idx, self.code(idx)))
    }
}

fn is_fn_header(line: &str) -> bool {
    let line = line
        .trim_start_matches("pub(crate) ")
        .trim_start_matches("pub ")
        .trim_start_matches("const ");
    line.starts_with("fn ")
}

/// Every `.rs` file under the production directories
#[must_use]
pub fn production_files() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_DIRS {
        for entry in walkdir::WalkDir::new(root.join(dir))
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                if let Ok(file) = SourceFile::load(entry.path()) {
                    files.push(file);
                }
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(code: &str) -> SourceFile {
        SourceFile::from_source(Path::new("sample.rs"), code)
    }

    #[test]
    fn test_async_function_detection() {
        let file = source(
            "pub async fn bad() {\n    let contents = std::fs::read_to_string(\"x\");\n}\n",
        );
        assert_eq!(file.enclosing(1), Enclosing::Async);
    }

    #[test]
    fn test_sync_function_detection() {
        let file = source("pub fn ok() {\n    let contents = std::fs::read(\"x\");\n}\n");
        assert_eq!(file.enclosing(1), Enclosing::Sync);
    }

    #[test]
    fn test_spawned_block_is_async() {
        let file = source(
            "fn spawn_it() {\n    tokio::spawn(async move {\n        std::thread::sleep(d);\n    });\n}\n",
        );
        assert_eq!(file.enclosing(2), Enclosing::Async);
    }

    #[test]
    fn test_test_module_detection() {
        let file = source("fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n");
        assert!(!file.is_test_code(0));
        assert!(file.is_test_code(3));
        assert_eq!(file.production_lines().count(), 1);
    }

    #[test]
    fn test_comments_are_ignored() {
        let file = source("// std::fs::read\nlet x = 1; // std::net::TcpStream\n");
        assert_eq!(file.code(0), "");
        assert_eq!(file.code(1), "let x = 1;");
    }

    #[test]
    fn test_production_dirs_exist() {
        assert!(!production_files().is_empty());
    }
}
