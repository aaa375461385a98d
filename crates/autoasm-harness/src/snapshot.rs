#![forbid(unsafe_code)]

//! Golden-file assertions for panel transcripts.
//!
//! Snapshot files live under `tests/snapshots/{name}.snap` relative to the
//! calling crate. Run with `BLESS=1` to create or update them:
//!
//! ```sh
//! BLESS=1 cargo test
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Comparison mode for snapshot testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Byte-exact string comparison.
    Exact,
    /// Trim trailing whitespace on each line before comparing.
    TrimTrailing,
}

fn normalize(text: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Exact => text.to_string(),
        MatchMode::TrimTrailing => text
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Line-by-line diff: ` ` common, `-` expected only, `+` actual only.
///
/// Empty when the inputs are identical.
#[must_use]
pub fn diff_text(expected: &str, actual: &str) -> String {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let mut out = String::new();
    let mut has_diff = false;
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        match (expected_lines.get(i), actual_lines.get(i)) {
            (Some(e), Some(a)) if e == a => {
                let _ = writeln!(out, " {e}");
            }
            (e, a) => {
                if let Some(e) = e {
                    let _ = writeln!(out, "-{e}");
                }
                if let Some(a) = a {
                    let _ = writeln!(out, "+{a}");
                }
                has_diff = true;
            }
        }
    }

    if has_diff { out } else { String::new() }
}

fn snapshot_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.snap"))
}

fn is_bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Assert that `actual` matches the stored snapshot `name`.
///
/// # Panics
///
/// When the snapshot is missing (and `BLESS` is unset) or differs.
pub fn assert_text_snapshot(name: &str, actual: &str, base_dir: &str, mode: MatchMode) {
    let path = snapshot_path(Path::new(base_dir), name);

    if is_bless() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create snapshot directory");
        }
        std::fs::write(&path, actual).expect("failed to write snapshot");
        return;
    }

    match std::fs::read_to_string(&path) {
        Ok(expected) => {
            let norm_expected = normalize(&expected, mode);
            let norm_actual = normalize(actual, mode);
            if norm_expected != norm_actual {
                let diff = diff_text(&norm_expected, &norm_actual);
                panic!(
                    "\n\
                     === Snapshot mismatch: '{name}' ===\n\
                     File: {}\n\
                     Mode: {mode:?}\n\
                     Set BLESS=1 to update.\n\n\
                     Diff (- expected, + actual):\n{diff}",
                    path.display()
                );
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            panic!(
                "\n\
                 === No snapshot found: '{name}' ===\n\
                 Expected at: {}\n\
                 Run with BLESS=1 to create it.\n\n\
                 Actual output:\n{actual}",
                path.display(),
            );
        }
        Err(e) => panic!("Failed to read snapshot '{}': {e}", path.display()),
    }
}

/// Compare text against `tests/snapshots/{name}.snap` of the calling crate.
///
/// ```ignore
/// assert_snapshot!("assembler_control_panels", &panels);
/// assert_snapshot!("raw_panel", &text, MatchMode::Exact);
/// ```
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $text:expr) => {
        $crate::assert_text_snapshot(
            $name,
            $text,
            env!("CARGO_MANIFEST_DIR"),
            $crate::MatchMode::TrimTrailing,
        )
    };
    ($name:expr, $text:expr, $mode:expr) => {
        $crate::assert_text_snapshot($name, $text, env!("CARGO_MANIFEST_DIR"), $mode)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_identical_is_empty() {
        assert_eq!(diff_text("a\nb", "a\nb"), "");
    }

    #[test]
    fn diff_marks_changed_and_extra_lines() {
        assert_eq!(diff_text("a\nb", "a\nc\nd"), " a\n-b\n+c\n+d\n");
    }

    #[test]
    fn trim_trailing_ignores_padding() {
        assert_eq!(normalize(" Done \n x  ", MatchMode::TrimTrailing), " Done\n x");
        assert_eq!(normalize(" Done \n", MatchMode::Exact), " Done \n");
    }

    #[test]
    fn snapshot_path_construction() {
        assert_eq!(
            snapshot_path(Path::new("/crates/autoasm"), "panels"),
            PathBuf::from("/crates/autoasm/tests/snapshots/panels.snap")
        );
    }

    #[test]
    fn stored_snapshot_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "match");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, " ( ) PB-Test\n Done\n").unwrap();

        assert_text_snapshot(
            "match",
            " ( ) PB-Test \n Done \n",
            dir.path().to_str().unwrap(),
            MatchMode::TrimTrailing,
        );
    }

    #[test]
    #[should_panic(expected = "Snapshot mismatch")]
    fn mismatch_panics() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), "mismatch");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "expected").unwrap();

        assert_text_snapshot("mismatch", "actual", dir.path().to_str().unwrap(), MatchMode::Exact);
    }

    #[test]
    #[should_panic(expected = "No snapshot found")]
    fn missing_snapshot_panics() {
        let dir = tempfile::tempdir().unwrap();
        assert_text_snapshot("missing", "x", dir.path().to_str().unwrap(), MatchMode::Exact);
    }
}
