//! Locate diagram files under a path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Diagram files at `root`.
///
/// A file is returned as-is. For a directory, files whose extension matches
/// `extension` (ASCII case-insensitive) are returned, descending into
/// subdirectories only when `recursive` is set. Output is sorted.
pub fn discover(root: &Path, recursive: bool, extension: &str) -> Result<Vec<PathBuf>> {
    let meta =
        fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;
    if meta.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !meta.is_dir() {
        bail!("{} is neither a file nor a directory", root.display());
    }

    let mut out = Vec::new();
    collect_diagrams(root, recursive, extension, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_diagrams(
    dir: &Path,
    recursive: bool,
    extension: &str,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("cannot read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read {}", dir.display()))?;
        let path = entry.path();
        let meta = entry
            .metadata()
            .with_context(|| format!("cannot access {}", path.display()))?;
        if meta.is_dir() {
            if recursive {
                collect_diagrams(&path, recursive, extension, out)?;
            }
        } else if meta.is_file() && has_extension(&path, extension) {
            out.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "A->B: x\n").unwrap();
    }

    fn layout() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.wsd"));
        touch(&dir.path().join("a.WSD"));
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested").join("deep").join("c.wsd"));
        dir
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn top_level_only_by_default() {
        let dir = layout();
        let found = discover(dir.path(), false, "wsd").unwrap();
        assert_eq!(names(&found, dir.path()), vec!["a.WSD", "b.wsd"]);
    }

    #[test]
    fn recursive_descends() {
        let dir = layout();
        let found = discover(dir.path(), true, "wsd").unwrap();
        assert_eq!(
            names(&found, dir.path()),
            vec!["a.WSD", "b.wsd", "nested/deep/c.wsd"]
        );
    }

    #[test]
    fn single_file_is_returned_regardless_of_extension() {
        let dir = layout();
        let file = dir.path().join("notes.txt");
        assert_eq!(discover(&file, false, "wsd").unwrap(), vec![file]);
    }

    #[test]
    fn extension_may_carry_a_dot() {
        let dir = layout();
        assert_eq!(discover(dir.path(), false, ".txt").unwrap().len(), 1);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), false, "wsd").unwrap_err();
        assert!(err.to_string().contains("cannot access"), "got: {err}");
    }
}
