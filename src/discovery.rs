//! Target Discovery
//!
//! Resolves command-line inputs into the list of PNG files to process:
//! - Folder mode: every `.png` in a directory, optionally descending into
//!   sub-directories
//! - File mode: explicitly named files, each validated up front
//!
//! Invalid files are returned as rejections rather than aborting the run.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{Result, PrismError};

/// Resolved batch input
#[derive(Debug, Default)]
pub struct Targets {
    /// Files to process, de-duplicated, in discovery order
    pub paths: Vec<PathBuf>,
    /// Named files that failed validation
    pub rejected: Vec<(PathBuf, PrismError)>,
}

impl Targets {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Collect `.png` files (case-insensitive) inside `dir`, sorted by path
pub fn collect_folder(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(dir)
        .map_err(|e| PrismError::input(dir, format!("unable to read directory: {}", e)))?;
    if !metadata.is_dir() {
        return Err(PrismError::input(dir, "not a directory"));
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .map_err(|e| PrismError::input(&current, format!("unable to read directory: {}", e)))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_file() && is_png(&path) {
                files.push(path);
            } else if recursive && file_type.is_dir() {
                pending.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Check that `path` is an existing regular file with a `.png` extension
pub fn validate_file(path: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(path)
        .map_err(|_| PrismError::input(path, "path does not exist"))?;
    if !metadata.is_file() {
        return Err(PrismError::input(path, "not a regular file"));
    }
    if !is_png(path) {
        return Err(PrismError::input(path, "not a .png file"));
    }
    Ok(path.to_path_buf())
}

/// Turn CLI inputs into targets. A folder takes precedence over files.
pub fn resolve_targets(files: &[PathBuf], folder: Option<&Path>, recursive: bool) -> Result<Targets> {
    let mut targets = Targets::default();

    let candidates = match folder {
        Some(dir) => collect_folder(dir, recursive)?,
        None => {
            let mut valid = Vec::new();
            for file in files {
                match validate_file(file) {
                    Ok(path) => valid.push(path),
                    Err(e) => targets.rejected.push((file.clone(), e)),
                }
            }
            valid
        }
    };

    // Two spellings of one file must not be processed concurrently
    let mut seen = HashSet::new();
    for path in candidates {
        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            targets.paths.push(path);
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_collect_folder_filters_png() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.PNG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested").join("c.png"));

        let files = collect_folder(dir.path(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }

    #[test]
    fn test_collect_folder_recursive() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("top.png"));
        touch(&dir.path().join("one").join("mid.png"));
        touch(&dir.path().join("one").join("two").join("deep.png"));
        touch(&dir.path().join("one").join("two").join("skip.jpg"));

        let files = collect_folder(dir.path(), true).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().any(|p| p.ends_with("one/two/deep.png")));
    }

    #[test]
    fn test_collect_folder_rejects_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("x.png");
        touch(&file);
        assert!(matches!(collect_folder(&file, false), Err(PrismError::Input { .. })));
        assert!(collect_folder(&dir.path().join("missing"), false).is_err());
    }

    #[test]
    fn test_validate_file() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("ok.png");
        let txt = dir.path().join("bad.txt");
        touch(&png);
        touch(&txt);

        assert_eq!(validate_file(&png).unwrap(), png);
        assert!(validate_file(&txt).is_err());
        assert!(validate_file(dir.path()).is_err());
        assert!(validate_file(&dir.path().join("gone.png")).is_err());
    }

    #[test]
    fn test_resolve_files_splits_rejected_and_dedups() {
        let dir = tempdir().unwrap();
        let png = dir.path().join("ok.png");
        touch(&png);
        let missing = dir.path().join("missing.png");

        let targets = resolve_targets(&[png.clone(), missing.clone(), png.clone()], None, false).unwrap();

        assert_eq!(targets.paths, vec![png]);
        assert_eq!(targets.rejected.len(), 1);
        assert_eq!(targets.rejected[0].0, missing);
    }

    #[test]
    fn test_resolve_folder_ignores_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("in_folder.png"));
        let targets = resolve_targets(&[PathBuf::from("elsewhere.png")], Some(dir.path()), false).unwrap();
        assert_eq!(targets.paths.len(), 1);
        assert!(targets.rejected.is_empty());
    }
}
