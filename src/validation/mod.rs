//! Catalog validation pass.
//!
//! Loads the taxonomy and any descriptor schemas, scans the three type
//! directories, then runs the duplicate-id check, the per-file rules, and the
//! index consistency check. Findings accumulate in a [`Report`]; only setup
//! failures (unreadable taxonomy, unreadable directories) abort the pass.

pub mod consistency;
pub mod duplicates;
pub mod rules;

pub use consistency::check_index;
pub use duplicates::check_duplicates;
pub use rules::{validate_entry, validate_file};

use crate::CatalogLayout;
use crate::catalog::{CatalogFiles, CategorySet, relative_display};
use crate::diagnostics::Report;
use crate::schema_loader::DescriptorSchemas;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Immutable inputs shared by every per-file check in one run.
pub struct ValidationContext {
    pub catalog_dir: PathBuf,
    pub categories: CategorySet,
    pub schemas: DescriptorSchemas,
}

/// Result of a full validation pass.
pub struct ValidationOutcome {
    pub files: CatalogFiles,
    pub report: Report,
}

impl ValidationOutcome {
    pub fn summary_line(&self) -> String {
        format!(
            "Validated: {} apps, {} fonts, {} tweaks",
            self.files.apps.len(),
            self.files.fonts.len(),
            self.files.tweaks.len()
        )
    }
}

pub fn validate_catalog(layout: &CatalogLayout) -> Result<ValidationOutcome> {
    let categories = CategorySet::load(&layout.categories_file())
        .context("loading category taxonomy")?;
    info!(count = categories.len(), "loaded categories");

    let files = CatalogFiles::scan(&layout.catalog_dir)?;
    let mut report = Report::new();

    let (schemas, failures) = DescriptorSchemas::load(&layout.schema_dir());
    for failure in failures {
        report.error(
            relative_display(&layout.catalog_dir, &failure.path),
            format!("failed to load schema: {:#}", failure.error),
        );
    }

    let ctx = ValidationContext {
        catalog_dir: layout.catalog_dir.clone(),
        categories,
        schemas,
    };

    for (entry_type, paths) in files.iter() {
        check_duplicates(paths, entry_type, &ctx.catalog_dir, &mut report);
    }

    for (entry_type, paths) in files.iter() {
        for path in paths {
            validate_file(&ctx, entry_type, path, &mut report);
        }
    }

    check_index(&layout.index_file(), &files, &mut report);

    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    Ok(ValidationOutcome { files, report })
}
