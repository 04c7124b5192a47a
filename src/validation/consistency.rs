//! Cross-check of `index.yaml` against the descriptors on disk.

use crate::catalog::{CatalogFiles, ClosedSet, EntryType, entry_id};
use crate::diagnostics::Report;
use crate::index::INDEX_FILE_NAME;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct IndexedId {
    id: String,
}

/// Just the ids of a persisted index. Other fields may be missing or
/// hand-edited without hiding the per-entry checks.
#[derive(Debug, Default, Deserialize)]
struct IndexedIds {
    #[serde(default)]
    apps: Vec<IndexedId>,
    #[serde(default)]
    fonts: Vec<IndexedId>,
    #[serde(default)]
    tweaks: Vec<IndexedId>,
}

impl IndexedIds {
    fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let document: Option<Self> = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        match document {
            Some(document) => Ok(document),
            None => bail!("{} is empty", path.display()),
        }
    }

    fn list(&self, entry_type: EntryType) -> &[IndexedId] {
        match entry_type {
            EntryType::App => &self.apps,
            EntryType::Font => &self.fonts,
            EntryType::Tweak => &self.tweaks,
        }
    }
}

/// Compare the persisted index with the live file set.
///
/// Index ids with no descriptor are errors (the index points at nothing);
/// descriptors absent from the index are warnings (the index is merely stale).
/// If the index cannot be loaded at all, one error is recorded and no
/// per-entry checks run.
pub fn check_index(index_path: &Path, files: &CatalogFiles, report: &mut Report) {
    let index = match IndexedIds::load(index_path) {
        Ok(index) => index,
        Err(err) => {
            report.error(INDEX_FILE_NAME, format!("failed to validate index: {err:#}"));
            return;
        }
    };

    for (entry_type, paths) in files.iter() {
        let label = entry_type.as_str();
        let file_ids: BTreeSet<String> = paths.iter().map(|p| entry_id(p)).collect();
        let indexed = index.list(entry_type);

        for entry in indexed {
            if !file_ids.contains(&entry.id) {
                report.error(
                    INDEX_FILE_NAME,
                    format!("{label} '{}' in index but no file found", entry.id),
                );
            }
        }

        let index_ids: BTreeSet<&str> = indexed.iter().map(|e| e.id.as_str()).collect();
        let mut reported = BTreeSet::new();
        for path in paths {
            let id = entry_id(path);
            if !index_ids.contains(id.as_str()) && reported.insert(id.clone()) {
                report.warn(
                    INDEX_FILE_NAME,
                    format!("{label} file '{id}' exists but missing from index"),
                );
            }
        }
    }
}
