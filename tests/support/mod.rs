#![allow(dead_code)]

use anyhow::{Context, Result};
use perch_catalog::CatalogLayout;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const CATEGORIES: &str = r#"
Development:
  label: Development
  children:
    Editors:
      label: Editors
    Runtimes: ~
Utilities:
  label: Utilities
Fonts:
  children:
    Monospace: ~
System:
  children:
    Explorer: ~
"#;

pub const APP_CODE: &str = r#"name: Visual Studio Code
category: Development/Editors
tags: [editor, ide]
description: Code editor
kind: app
profiles: [developer]
os: [windows, linux, macos]
links:
  github: https://github.com/microsoft/vscode
  website: https://code.visualstudio.com
install:
  winget: Microsoft.VisualStudioCode
"#;

pub const APP_ZED: &str = r#"name: Zed
category: Development/Editors
tags: [editor]
description: Fast editor
install:
  winget: ZedIndustries.Zed
"#;

pub const APP_ECLAIR: &str = r#"name: Éclair
category: Utilities
tags: [misc]
description: Accented name
hidden: true
install:
  winget: Eclair.Eclair
"#;

pub const FONT_FIRA: &str = r#"name: Fira Code
category: Fonts/Monospace
tags: [ligatures]
install:
  winget: FiraCode
"#;

pub const TWEAK_EXT: &str = r#"type: tweak
name: Show File Extensions
category: System/Explorer
tags: [explorer]
description: Show extensions for known file types
registry:
  - key: HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced
    name: HideFileExt
    value: 0
    type: dword
"#;

/// A throwaway project root with `catalog/` populated from fixtures.
pub struct TempCatalog {
    dir: TempDir,
}

impl TempCatalog {
    /// Empty catalog with only the taxonomy in place.
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("allocating temp catalog")?;
        let catalog = Self { dir };
        catalog.write("categories.yaml", CATEGORIES)?;
        for sub in ["apps", "fonts", "tweaks"] {
            fs::create_dir_all(catalog.catalog_dir().join(sub))?;
        }
        Ok(catalog)
    }

    /// A small catalog that validates cleanly once its index is generated.
    pub fn sample() -> Result<Self> {
        let catalog = Self::empty()?;
        catalog.write("apps/code.yaml", APP_CODE)?;
        catalog.write("apps/editors/zed.yaml", APP_ZED)?;
        catalog.write("apps/eclair.yaml", APP_ECLAIR)?;
        catalog.write("fonts/fira-code.yaml", FONT_FIRA)?;
        catalog.write("tweaks/explorer/show-file-extensions.yaml", TWEAK_EXT)?;
        Ok(catalog)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.root().join("catalog")
    }

    pub fn layout(&self) -> CatalogLayout {
        CatalogLayout::new(self.root())
    }

    /// Write `contents` at `rel` under the catalog directory.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.catalog_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.catalog_dir().join(rel);
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    pub fn remove(&self, rel: &str) -> Result<()> {
        fs::remove_file(self.catalog_dir().join(rel))?;
        Ok(())
    }
}

pub fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_perch-catalog"));
    cmd.env_remove("PERCH_ROOT").env_remove("PERCH_LOG");
    cmd
}

pub fn run_cli(root: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = cli();
    cmd.arg("--root").arg(root).args(args);
    cmd.output().context("spawning perch-catalog")
}
