//! Catalog descriptors on disk.
//!
//! The catalog lives under `catalog/` with one YAML descriptor per entry,
//! grouped into `apps/`, `fonts/`, and `tweaks/` (nested as deeply as authors
//! like). This module discovers those files, parses them into typed entries,
//! and loads the category taxonomy they reference. Rules about what a valid
//! entry looks like live in `validation`.

pub mod categories;
pub mod identity;
pub mod model;
pub mod scan;

pub use categories::{CategorySet, CategoryTree, children_of};
pub use identity::{AppKind, ClosedSet, EntryType, InvalidValue, Os, Profile, RegistryType};
pub use model::{
    AppEntry, CatalogEntry, Descriptor, EntryCommon, FontEntry, Links, RegistryEntry, TweakEntry,
    is_truthy, load_entry,
};
pub use scan::{CatalogFiles, collect_descriptor_files, entry_id, relative_display};

/// Default catalog directory, relative to the project root.
pub const DEFAULT_CATALOG_DIR: &str = "catalog";
