// File search + read/transform/write helpers shared by every hook.
// ref: glob crate — https://docs.rs/glob/

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::path::{Component, Path, PathBuf};

/// Directories never searched: build outputs, vendored code, Cordova's own lib.
const SKIP_DIRS: &[&str] = &["build", "node_modules", ".gradle", "Pods", "DerivedData", "CordovaLib"];

/// All files under `root` matching any of `patterns` (relative globs), sorted.
pub fn find_all_files(root: &Path, patterns: &[&str]) -> Vec<PathBuf> {
    let base = Pattern::escape(&root.to_string_lossy());
    let mut found: Vec<PathBuf> = patterns.iter()
        .filter_map(|pattern| glob(&format!("{}/{}", base, pattern)).ok())
        .flat_map(|paths| paths.filter_map(|p| p.ok()))
        .filter(|p| p.is_file() && !is_skipped(root, p))
        .collect();
    found.sort();
    found.dedup();
    found
}

/// First file named `name` anywhere below `root`.
pub fn find_file(root: &Path, name: &str) -> Option<PathBuf> {
    find_all_files(root, &[&format!("**/{}", name)]).into_iter().next()
}

fn is_skipped(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n)),
        _ => false,
    })
}

/// Read → transform → write back only when the text changed.
/// Returns whether the file was written.
pub fn patch_file<F>(path: &Path, transform: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<String>,
{
    let original = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let updated = transform(&original)
        .with_context(|| format!("editing {}", path.display()))?;
    if updated == original { return Ok(false); }
    std::fs::write(path, updated)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}

/// Write `contents`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let p = root.join(rel);
        write_file(&p, "x").unwrap();
        p
    }

    #[test]
    fn finds_files_and_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let a = touch(root, "app/src/main/res/values/colors.xml");
        let b = touch(root, "app/src/main/res/values-night/colors.xml");
        touch(root, "app/build/intermediates/colors.xml");
        touch(root, "CordovaLib/res/values/colors.xml");

        let found = find_all_files(root, &["**/colors.xml"]);
        assert_eq!(found, vec![a.clone(), b]);
        assert_eq!(find_file(root, "colors.xml"), Some(a));
        assert_eq!(find_file(root, "missing.xml"), None);
    }

    #[test]
    fn patch_file_only_writes_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let p = touch(dir.path(), "a.txt");
        assert!(!patch_file(&p, |s| Ok(s.to_string())).unwrap());
        assert!(patch_file(&p, |s| Ok(format!("{}y", s))).unwrap());
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "xy");
    }
}
