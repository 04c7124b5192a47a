//! The site index: a compact, sorted projection of every catalog entry.
//!
//! `index.yaml` is the only data source the site generator reads. It is
//! rebuilt from scratch on every run and must be derivable from the
//! descriptors alone, so building twice over an unchanged catalog produces
//! byte-identical output.

use crate::catalog::{CatalogEntry, CatalogFiles, EntryType, load_entry};
use crate::collate;
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const INDEX_FILE_NAME: &str = "index.yaml";

const INDEX_HEADER: &str = "# Auto-generated from catalog entries. Do not edit manually.\n# Run: perch-catalog index\n\n";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl IndexEntry {
    /// Project a parsed entry. Name and category are required here; the
    /// index is only built from catalogs that already pass validation.
    pub fn project(entry: &CatalogEntry) -> Result<Self> {
        let common = entry.common();
        let name = common
            .name()
            .ok_or_else(|| anyhow!("{} '{}' has no name", entry.entry_type(), entry.id()))?;
        let category = common
            .category()
            .ok_or_else(|| anyhow!("{} '{}' has no category", entry.entry_type(), entry.id()))?;
        Ok(Self {
            id: entry.id().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            tags: common.tags().to_vec(),
            kind: entry.kind().map(str::to_string),
            profiles: common.profiles().to_vec(),
            hidden: common.is_hidden(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub apps: Vec<IndexEntry>,
    #[serde(default)]
    pub fonts: Vec<IndexEntry>,
    #[serde(default)]
    pub tweaks: Vec<IndexEntry>,
}

impl IndexDocument {
    /// Parse every descriptor under `files` and build the sorted index.
    pub fn build(files: &CatalogFiles) -> Result<Self> {
        let mut index = Self::default();
        for (entry_type, paths) in files.iter() {
            let mut entries = Vec::with_capacity(paths.len());
            for path in paths {
                let entry = load_entry(path, entry_type)
                    .with_context(|| format!("loading {}", path.display()))?;
                let projected = IndexEntry::project(&entry)
                    .with_context(|| format!("indexing {}", path.display()))?;
                entries.push(projected);
            }
            entries.sort_by(|a, b| collate::compare(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
            debug!(kind = %entry_type, count = entries.len(), "indexed entries");
            *index.list_mut(entry_type) = entries;
        }
        Ok(index)
    }

    pub fn list(&self, entry_type: EntryType) -> &[IndexEntry] {
        match entry_type {
            EntryType::App => &self.apps,
            EntryType::Font => &self.fonts,
            EntryType::Tweak => &self.tweaks,
        }
    }

    fn list_mut(&mut self, entry_type: EntryType) -> &mut Vec<IndexEntry> {
        match entry_type {
            EntryType::App => &mut self.apps,
            EntryType::Font => &mut self.fonts,
            EntryType::Tweak => &mut self.tweaks,
        }
    }

    /// Serialized artifact: disclaimer header followed by the YAML body.
    pub fn render(&self) -> Result<String> {
        let body = serde_yaml::to_string(self).context("serializing index")?;
        Ok(format!("{INDEX_HEADER}{body}"))
    }

    /// Overwrite `path` with the rendered index.
    pub fn write(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote index");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let document: Option<Self> = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        match document {
            Some(document) => Ok(document),
            None => bail!("{} is empty", path.display()),
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Generated {INDEX_FILE_NAME}: {} apps, {} fonts, {} tweaks",
            self.apps.len(),
            self.fonts.len(),
            self.tweaks.len()
        )
    }
}

/// Scan the catalog, build the index, and write it to `index_path`.
pub fn generate_index(catalog_dir: &Path, index_path: &Path) -> Result<IndexDocument> {
    let files = CatalogFiles::scan(catalog_dir)?;
    let index = IndexDocument::build(&files)?;
    index.write(index_path)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppEntry, EntryCommon};

    fn app(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry::App(AppEntry {
            id: id.to_string(),
            common: EntryCommon {
                name: Some(name.to_string()),
                category: Some("Dev".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn optional_fields_are_conditional() {
        let entry = IndexEntry::project(&app("code", "Code")).unwrap();
        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert_eq!(yaml, "id: code\nname: Code\ncategory: Dev\ntags: []\n");

        let mut full = app("code", "Code");
        if let CatalogEntry::App(inner) = &mut full {
            inner.kind = Some("cli-tool".to_string());
            inner.common.profiles = Some(vec!["developer".to_string()]);
            inner.common.hidden = Some(true);
        }
        let entry = IndexEntry::project(&full).unwrap();
        assert_eq!(entry.kind.as_deref(), Some("cli-tool"));
        assert_eq!(entry.profiles, vec!["developer"]);
        assert!(entry.hidden);
    }

    #[test]
    fn hidden_false_and_empty_profiles_are_omitted() {
        let mut entry = app("x", "X");
        if let CatalogEntry::App(inner) = &mut entry {
            inner.common.profiles = Some(Vec::new());
            inner.common.hidden = Some(false);
        }
        let yaml = serde_yaml::to_string(&IndexEntry::project(&entry).unwrap()).unwrap();
        assert!(!yaml.contains("profiles"));
        assert!(!yaml.contains("hidden"));
    }

    #[test]
    fn missing_name_is_fatal() {
        let mut entry = app("x", "X");
        if let CatalogEntry::App(inner) = &mut entry {
            inner.common.name = None;
        }
        assert!(IndexEntry::project(&entry).is_err());
    }

    #[test]
    fn render_has_header_and_fixed_keys() {
        let index = IndexDocument::default();
        let rendered = index.render().unwrap();
        assert!(rendered.starts_with(INDEX_HEADER));
        assert!(rendered.ends_with("apps: []\nfonts: []\ntweaks: []\n"));
    }
}
