//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Production code in the exhibit crates MUST NOT block the
//! runtime. Sensor polls, config loading and helper processes all run on
//! tokio worker threads, and a blocked worker stalls the playback sync loop.
//!
//! **Required**: `tokio::fs`, `tokio::process`, async `reqwest`. Blocking
//! decoders run in plain `fn`s called through `spawn_blocking`.

use architectural_enforcement::{production_files, Enclosing, SourceFile};

/// Patterns forbidden anywhere in production code
const ALWAYS_FORBIDDEN: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("use std::fs", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("use std::net", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
];

/// Patterns forbidden inside async code only
const FORBIDDEN_IN_ASYNC: &[(&str, &str)] = &[
    ("std::thread::sleep", "Thread sleep in async code"),
    ("WavReader::open", "Blocking decoder open in async code"),
    ("std::io::stdin()", "Blocking stdin in async code"),
    (".exists()", "Blocking path check in async code"),
];

fn violations_in(file: &SourceFile) -> Vec<String> {
    let mut violations = Vec::new();

    for (idx, code) in file.production_lines() {
        for (pattern, what) in ALWAYS_FORBIDDEN {
            if code.contains(pattern) {
                violations.push(format!(
                    "{}:{} - {what}: {}",
                    file.path.display(),
                    idx + 1,
                    code.trim()
                ));
            }
        }

        if file.enclosing(idx) != Enclosing::Async {
            continue;
        }
        for (pattern, what) in FORBIDDEN_IN_ASYNC {
            if code.contains(pattern) {
                violations.push(format!(
                    "{}:{} - {what}: {}",
                    file.path.display(),
                    idx + 1,
                    code.trim()
                ));
            }
        }
    }

    violations
}

#[test]
fn test_no_blocking_io_in_production_code() {
    let violations: Vec<String> = production_files().iter().flat_map(violations_in).collect();

    if !violations.is_empty() {
        eprintln!("\nBlocking I/O found in production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nUse tokio::fs, tokio::process, async reqwest, or spawn_blocking.");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_detector_flags_blocking_read_in_async_fn() {
    let file = SourceFile::from_source(
        std::path::Path::new("sample.rs"),
        "async fn level(&self) -> Level {\n    let raw = std::fs::read_to_string(&self.path);\n}\n",
    );
    assert_eq!(violations_in(&file).len(), 1);
}

#[test]
fn test_detector_allows_decoder_in_blocking_helper() {
    let file = SourceFile::from_source(
        std::path::Path::new("sample.rs"),
        "fn wav_duration(path: &Path) -> Duration {\n    let reader = hound::WavReader::open(path);\n}\n",
    );
    assert!(violations_in(&file).is_empty());
}

#[test]
fn test_detector_ignores_test_module() {
    let file = SourceFile::from_source(
        std::path::Path::new("sample.rs"),
        "#[cfg(test)]\nmod tests {\n    async fn t() { std::thread::sleep(d); }\n}\n",
    );
    assert!(violations_in(&file).is_empty());
}
