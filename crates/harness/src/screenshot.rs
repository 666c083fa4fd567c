//! Failure screenshot files
//!
//! Names must be unique across parallel scenarios and safe on every
//! filesystem: sanitized step text (bounded length), a millisecond
//! timestamp, and the thread id. Attachments are referenced relative to
//! the report directory so the whole output folder stays movable.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::HarnessResult;

const MAX_STEP_CHARS: usize = 60;

/// Write PNG bytes for a failed step, returning the file path.
pub fn save(dir: &Path, step_text: &str, png: &[u8]) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let name = format!(
        "SCR_{}_{}_t{}.png",
        sanitize(step_text),
        Local::now().format("%Y%m%d_%H%M%S_%3f"),
        thread_label()
    );
    let path = dir.join(name);
    std::fs::write(&path, png)?;
    Ok(path)
}

/// Express `target` relative to `base` when it sits beneath it; otherwise
/// the path is returned unchanged.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    target
        .strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| target.to_path_buf())
}

fn sanitize(step: &str) -> String {
    let cleaned: String = step
        .chars()
        .take(MAX_STEP_CHARS)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "step".to_string()
    } else {
        trimmed.replace(' ', "_")
    }
}

fn thread_label() -> String {
    // ThreadId has no stable accessor; its Debug form carries the number.
    let id = format!("{:?}", std::thread::current().id());
    let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_invalid_chars_and_truncates() {
        assert_eq!(sanitize("Add a language"), "Add_a_language");
        assert_eq!(sanitize(r#"submit "<script>" payload?"#), "submit___script___payload_");
        let long = "x".repeat(200);
        assert_eq!(sanitize(&long).len(), MAX_STEP_CHARS);
        assert_eq!(sanitize("///"), "___");
        assert_eq!(sanitize(""), "step");
    }

    #[test]
    fn save_writes_a_uniquely_prefixed_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = save(dir.path(), "Then the skill exists", &[0x89, 0x50, 0x4e, 0x47]).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("SCR_Then_the_skill_exists_"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), [0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn relative_paths_resolve_against_report_dir() {
        let base = Path::new("reports");
        let inside = Path::new("reports/screenshots/SCR_x.png");
        assert_eq!(
            relative_to(inside, base),
            PathBuf::from("screenshots/SCR_x.png")
        );
        let outside = Path::new("/tmp/elsewhere.png");
        assert_eq!(relative_to(outside, base), PathBuf::from("/tmp/elsewhere.png"));
    }
}
