//! Per-type structural rules.
//!
//! Every rule runs independently; a single descriptor can collect several
//! errors and warnings. Errors mark entries downstream consumers cannot trust
//! (missing required fields, closed-set violations, a tweak with no
//! mechanism). Warnings mark entries that are usable but incomplete.

use crate::catalog::{
    AppEntry, AppKind, CatalogEntry, CategorySet, ClosedSet, Descriptor, EntryCommon, EntryType,
    FontEntry, Os, Profile, RegistryType, TweakEntry, relative_display,
};
use crate::diagnostics::Report;
use crate::validation::ValidationContext;
use std::path::Path;
use tracing::debug;
use url::Url;

const GITHUB_PREFIX: &str = "https://github.com/";

/// Read, parse, and check one descriptor. Parse failures are recorded against
/// the file and never propagate.
pub fn validate_file(
    ctx: &ValidationContext,
    entry_type: EntryType,
    path: &Path,
    report: &mut Report,
) {
    let rel = relative_display(&ctx.catalog_dir, path);
    debug!(file = %rel, "validating");

    let descriptor = match Descriptor::read(path) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            report.parse_error(&rel, err.diagnostic_message());
            return;
        }
    };

    for message in ctx.schemas.check(entry_type, &descriptor.document) {
        report.error(&rel, message);
    }

    match descriptor.parse(entry_type) {
        Ok(entry) => validate_entry(&ctx.categories, &entry, &rel, report),
        Err(err) => report.parse_error(&rel, err.diagnostic_message()),
    }
}

/// Apply the rule set for `entry`'s type.
pub fn validate_entry(
    categories: &CategorySet,
    entry: &CatalogEntry,
    rel: &str,
    report: &mut Report,
) {
    let common = entry.common();
    check_required(common, rel, report);
    check_declared_type(common, entry.entry_type(), rel, report);

    match entry {
        CatalogEntry::App(app) => validate_app(categories, app, rel, report),
        CatalogEntry::Font(font) => validate_font(categories, font, rel, report),
        CatalogEntry::Tweak(tweak) => validate_tweak(categories, tweak, rel, report),
    }
}

fn validate_app(categories: &CategorySet, app: &AppEntry, rel: &str, report: &mut Report) {
    check_recommended(&app.common, rel, report);
    check_closed_value::<AppKind>(app.kind.as_deref(), rel, report);
    check_closed_list::<Profile>(app.common.profiles(), rel, report);
    check_closed_list::<Os>(app.os.as_deref().unwrap_or_default(), rel, report);
    check_category(categories, &app.common, rel, report);

    let is_dotfile = app.kind.as_deref() == Some(AppKind::Dotfile.as_str());
    if !is_dotfile && !app.install.as_ref().is_some_and(crate::catalog::is_truthy) {
        report.warn(rel, "non-dotfile app has no install section");
    }

    if let Some(links) = &app.links {
        if let Some(github) = links.github.as_deref().filter(|s| !s.is_empty()) {
            if !github.starts_with(GITHUB_PREFIX) {
                report.warn(rel, format!("suspicious github link: '{github}'"));
            }
        }
        if let Some(website) = links.website.as_deref().filter(|s| !s.is_empty()) {
            if !is_web_url(website) {
                report.warn(rel, format!("suspicious website link: '{website}'"));
            }
        }
    }
}

fn validate_font(categories: &CategorySet, font: &FontEntry, rel: &str, report: &mut Report) {
    if !font.install.as_ref().is_some_and(crate::catalog::is_truthy) {
        report.warn(rel, "missing: install");
    }
    check_closed_list::<Profile>(font.common.profiles(), rel, report);
    check_category(categories, &font.common, rel, report);
}

fn validate_tweak(categories: &CategorySet, tweak: &TweakEntry, rel: &str, report: &mut Report) {
    check_recommended(&tweak.common, rel, report);

    if !tweak.has_registry() && !tweak.has_script() {
        report.error(rel, "tweak must have registry entries or a script");
    }

    for entry in tweak.registry.iter().flatten() {
        if entry.key.as_deref().is_none_or(str::is_empty) {
            report.error(rel, "registry entry missing: key");
        }
        if entry.name.is_none() {
            report.error(rel, "registry entry missing: name");
        }
        check_closed_value::<RegistryType>(
            entry.value_type.as_deref().filter(|s| !s.is_empty()),
            rel,
            report,
        );
    }

    check_category(categories, &tweak.common, rel, report);
    check_closed_list::<Profile>(tweak.common.profiles(), rel, report);
}

fn check_required(common: &EntryCommon, rel: &str, report: &mut Report) {
    if common.name().is_none() {
        report.error(rel, "missing required field: name");
    }
    if common.category().is_none() {
        report.error(rel, "missing required field: category");
    }
}

fn check_recommended(common: &EntryCommon, rel: &str, report: &mut Report) {
    if common.tags().is_empty() {
        report.warn(rel, "missing or empty: tags");
    }
    if common.description().is_none() {
        report.warn(rel, "missing: description");
    }
}

fn check_category(categories: &CategorySet, common: &EntryCommon, rel: &str, report: &mut Report) {
    if let Some(category) = common.category() {
        if !categories.contains(category) {
            report.warn(rel, format!("category '{category}' not in categories.yaml"));
        }
    }
}

fn check_declared_type(common: &EntryCommon, actual: EntryType, rel: &str, report: &mut Report) {
    let Some(raw) = common.declared_type.as_deref().filter(|s| !s.is_empty()) else {
        return;
    };
    match EntryType::parse(raw) {
        Ok(declared) if declared != actual => report.warn(
            rel,
            format!("type '{raw}' does not match directory '{}'", actual.dir_name()),
        ),
        Ok(_) => {}
        Err(invalid) => report.error(rel, invalid.to_string()),
    }
}

fn check_closed_value<T: ClosedSet>(value: Option<&str>, rel: &str, report: &mut Report) {
    if let Some(raw) = value {
        if let Err(invalid) = T::parse(raw) {
            report.error(rel, invalid.to_string());
        }
    }
}

fn check_closed_list<T: ClosedSet>(values: &[String], rel: &str, report: &mut Report) {
    for raw in values {
        check_closed_value::<T>(Some(raw), rel, report);
    }
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}
