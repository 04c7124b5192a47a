//! Copy of the catalog into the deployable site output.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recursively copy `src` into `dest`, creating directories as needed and
/// overwriting files that already exist. Returns the number of files copied.
///
/// Symlinks follow the scanner's policy: links to files are copied as the
/// target's contents, links to directories and dangling links are skipped.
/// `dest` may not live inside `src`.
pub fn copy_catalog(src: &Path, dest: &Path) -> Result<usize> {
    let src_root =
        fs::canonicalize(src).with_context(|| format!("resolving {}", src.display()))?;
    let dest_root = resolve_missing(dest)?;
    if dest_root.starts_with(&src_root) {
        bail!(
            "refusing to copy {} into itself ({})",
            src.display(),
            dest.display()
        );
    }
    copy_tree(&src_root, &dest_root)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn resolve_missing(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut pending = Vec::new();
    while !existing.exists() {
        let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
            break;
        };
        pending.push(name);
        existing = parent;
    }
    let base = if existing.as_os_str().is_empty() {
        Path::new(".")
    } else {
        existing
    };
    let mut resolved =
        fs::canonicalize(base).with_context(|| format!("resolving {}", path.display()))?;
    resolved.extend(pending.into_iter().rev());
    Ok(resolved)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    let mut entries = fs::read_dir(src)
        .with_context(|| format!("reading {}", src.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing {}", src.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = 0;
    for entry in entries {
        let from = entry.path();
        let to = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", from.display()))?;

        if file_type.is_dir() {
            copied += copy_tree(&from, &to)?;
            continue;
        }
        if file_type.is_symlink() {
            match fs::metadata(&from) {
                Ok(target) if target.is_file() => {}
                Ok(_) => {
                    debug!(path = %from.display(), "not following directory symlink");
                    continue;
                }
                Err(err) => {
                    debug!(path = %from.display(), %err, "skipping dangling symlink");
                    continue;
                }
            }
        }
        fs::copy(&from, &to)
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))?;
        debug!(from = %from.display(), "copied");
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_nested_tree_and_overwrites() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("apps/dev")).unwrap();
        fs::write(src.path().join("index.yaml"), "apps: []\n").unwrap();
        fs::write(src.path().join("apps/dev/code.yaml"), "name: Code\n").unwrap();

        let target = dest.path().join("dist/catalog");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("index.yaml"), "stale").unwrap();

        assert_eq!(copy_catalog(src.path(), &target).unwrap(), 2);
        assert_eq!(fs::read_to_string(target.join("index.yaml")).unwrap(), "apps: []\n");
        assert_eq!(
            fs::read_to_string(target.join("apps/dev/code.yaml")).unwrap(),
            "name: Code\n"
        );
    }

    #[test]
    fn destination_inside_source_is_rejected() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("index.yaml"), "apps: []\n").unwrap();
        let err = copy_catalog(src.path(), &src.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("into itself"), "{err:#}");
        assert!(!src.path().join("out").exists());
    }

    #[cfg(unix)]
    #[test]
    fn directory_symlinks_are_skipped_file_symlinks_copied() {
        use std::os::unix::fs::symlink;

        let src = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("apps")).unwrap();
        fs::write(outside.path().join("shared.yaml"), "name: Shared\n").unwrap();
        symlink(outside.path(), src.path().join("apps/linked-dir")).unwrap();
        symlink(
            outside.path().join("shared.yaml"),
            src.path().join("apps/shared.yaml"),
        )
        .unwrap();
        symlink(src.path().join("missing"), src.path().join("apps/dangling.yaml")).unwrap();

        let target = dest.path().join("catalog");
        assert_eq!(copy_catalog(src.path(), &target).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(target.join("apps/shared.yaml")).unwrap(),
            "name: Shared\n"
        );
        assert!(!target.join("apps/linked-dir").exists());
        assert!(!target.join("apps/dangling.yaml").exists());
    }
}
