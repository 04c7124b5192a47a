//! Descriptor discovery.
//!
//! Walks a type directory depth-first and returns every `.yaml`/`.yml` file,
//! regardless of how authors nest subdirectories. Directory entries are
//! visited in file-name order so duplicate reporting is stable across
//! filesystems. Symlinked directories are skipped, which keeps the walk
//! finite; symlinked files are kept when they resolve to a regular file.

use crate::catalog::EntryType;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DESCRIPTOR_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Descriptor paths for every entry type, in discovery order.
#[derive(Clone, Debug, Default)]
pub struct CatalogFiles {
    pub apps: Vec<PathBuf>,
    pub fonts: Vec<PathBuf>,
    pub tweaks: Vec<PathBuf>,
}

impl CatalogFiles {
    pub fn scan(catalog_dir: &Path) -> Result<Self> {
        Ok(Self {
            apps: collect_descriptor_files(&catalog_dir.join(EntryType::App.dir_name()))?,
            fonts: collect_descriptor_files(&catalog_dir.join(EntryType::Font.dir_name()))?,
            tweaks: collect_descriptor_files(&catalog_dir.join(EntryType::Tweak.dir_name()))?,
        })
    }

    pub fn of(&self, entry_type: EntryType) -> &[PathBuf] {
        match entry_type {
            EntryType::App => &self.apps,
            EntryType::Font => &self.fonts,
            EntryType::Tweak => &self.tweaks,
        }
    }

    /// Iterates `(type, files)` pairs in the canonical apps/fonts/tweaks order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryType, &[PathBuf])> {
        EntryType::ALL.into_iter().map(|t| (t, self.of(t)))
    }
}

/// Recursively collect descriptor files below `dir`.
///
/// A missing directory yields an empty list; any other I/O failure is fatal.
pub fn collect_descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "descriptor directory missing; nothing to scan");
        return Ok(results);
    }
    walk(dir, &mut results)?;
    debug!(dir = %dir.display(), count = results.len(), "scanned descriptors");
    Ok(results)
}

fn walk(dir: &Path, results: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing directory {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let meta = fs::symlink_metadata(&path)
            .with_context(|| format!("inspecting {}", path.display()))?;
        let file_type = meta.file_type();

        if file_type.is_dir() {
            walk(&path, results)?;
        } else if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target) if target.is_file() => {
                    if is_descriptor(&path) {
                        results.push(path);
                    }
                }
                Ok(_) => debug!(path = %path.display(), "not following directory symlink"),
                Err(err) => debug!(path = %path.display(), %err, "skipping dangling symlink"),
            }
        } else if file_type.is_file() && is_descriptor(&path) {
            results.push(path);
        }
    }
    Ok(())
}

fn is_descriptor(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DESCRIPTOR_EXTENSIONS.contains(&ext))
}

/// Entry id: the descriptor's file name without its extension.
pub fn entry_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Path of `file` relative to `base`, for diagnostics. Falls back to the full
/// path when `file` lives outside `base`.
pub fn relative_display(base: &Path, file: &Path) -> String {
    file.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| file.display().to_string())
}
