use anyhow::{Context, Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod collate;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod logos;
pub mod schema_loader;
pub mod site;
pub mod validation;

pub use catalog::{CatalogEntry, CatalogFiles, CategorySet, EntryType};
pub use diagnostics::{Diagnostic, DiagnosticKind, Report, Severity};
pub use error::LoadError;
pub use index::{IndexDocument, IndexEntry, generate_index};
pub use validation::{ValidationOutcome, validate_catalog};

const ROOT_SENTINEL: &str = "catalog/categories.yaml";
pub const ROOT_ENV: &str = "PERCH_ROOT";

const CATEGORIES_FILE: &str = "categories.yaml";
const LOGOS_DIR: &str = "logos";
const DIST_DIR: &str = "dist";

/// Every path the pipeline reads or writes, derived from the project root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogLayout {
    pub root: PathBuf,
    pub catalog_dir: PathBuf,
}

impl CatalogLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let catalog_dir = root.join(catalog::DEFAULT_CATALOG_DIR);
        Self { root, catalog_dir }
    }

    /// Point at a catalog directory outside the default `<root>/catalog`.
    pub fn with_catalog_dir(mut self, catalog_dir: impl Into<PathBuf>) -> Self {
        self.catalog_dir = catalog_dir.into();
        self
    }

    pub fn categories_file(&self) -> PathBuf {
        self.catalog_dir.join(CATEGORIES_FILE)
    }

    pub fn index_file(&self) -> PathBuf {
        self.catalog_dir.join(index::INDEX_FILE_NAME)
    }

    pub fn logos_dir(&self) -> PathBuf {
        self.catalog_dir.join(LOGOS_DIR)
    }

    pub fn schema_dir(&self) -> PathBuf {
        self.catalog_dir.join(schema_loader::SCHEMA_DIR)
    }

    /// Where the deployable site expects its copy of the catalog.
    pub fn dist_catalog_dir(&self) -> PathBuf {
        self.root.join(DIST_DIR).join(catalog::DEFAULT_CATALOG_DIR)
    }
}

fn is_project_root(candidate: &Path) -> bool {
    candidate.join(ROOT_SENTINEL).is_file()
}

/// The nearest directory at or above `start` holding the sentinel taxonomy.
fn nearest_project_root(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).ok()?;
    start
        .ancestors()
        .find(|dir| is_project_root(dir))
        .map(Path::to_path_buf)
}

/// Locate the project root: `PERCH_ROOT` first, then the nearest ancestor of
/// the working directory that contains `catalog/categories.yaml`. A
/// `PERCH_ROOT` that is empty or lacks the sentinel is ignored.
pub fn find_project_root() -> Result<PathBuf> {
    let hinted = env::var_os(ROOT_ENV)
        .filter(|hint| !hint.is_empty())
        .map(PathBuf::from)
        .filter(|hint| is_project_root(hint))
        .and_then(|hint| fs::canonicalize(hint).ok());
    if let Some(root) = hinted {
        return Ok(root);
    }

    let cwd = env::current_dir().context("reading the working directory")?;
    match nearest_project_root(&cwd) {
        Some(root) => Ok(root),
        None => bail!(
            "Unable to locate the catalog project root (no {ROOT_SENTINEL} found). Run from inside the project or set {ROOT_ENV}."
        ),
    }
}

/// Resolve the layout from an explicit root, falling back to discovery.
pub fn resolve_layout(root: Option<&Path>, catalog_dir: Option<&Path>) -> Result<CatalogLayout> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => find_project_root()?,
    };
    let layout = CatalogLayout::new(root);
    Ok(match catalog_dir {
        Some(dir) => layout.with_catalog_dir(dir),
        None => layout,
    })
}
