use crate::catalog::{ClosedSet, EntryType, entry_id, relative_display};
use crate::diagnostics::Report;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Report ids that occur more than once within one entry type.
///
/// Every repeat cites the first file seen with that id; the first-seen record
/// is never replaced, so a third copy still points at the original.
pub fn check_duplicates(
    files: &[PathBuf],
    entry_type: EntryType,
    catalog_dir: &Path,
    report: &mut Report,
) {
    let mut first_seen: HashMap<String, String> = HashMap::new();
    for file in files {
        let id = entry_id(file);
        let rel = relative_display(catalog_dir, file);
        match first_seen.get(&id) {
            Some(original) => report.error(
                &rel,
                format!(
                    "duplicate {} id '{id}' (also at {original})",
                    entry_type.as_str()
                ),
            ),
            None => {
                first_seen.insert(id, rel);
            }
        }
    }
}
