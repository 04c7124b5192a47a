//! Optional JSON Schema checks for descriptors.
//!
//! A catalog may ship `schema/<type>.schema.json` next to its type
//! directories. When present, each schema is compiled once per run and every
//! parsed descriptor of that type (converted from YAML to JSON) is validated
//! against it. Missing schema files simply disable the check for that type.

use crate::catalog::{ClosedSet, EntryType};
use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory (relative to the catalog root) holding descriptor schemas.
pub const SCHEMA_DIR: &str = "schema";

/// Compiled schemas keyed by entry type.
#[derive(Default)]
pub struct DescriptorSchemas {
    compiled: BTreeMap<EntryType, JSONSchema>,
}

/// A schema file that exists but could not be compiled.
#[derive(Debug)]
pub struct SchemaLoadFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

impl DescriptorSchemas {
    /// Load every schema present under `schema_dir`. Broken schemas are
    /// returned alongside so callers can report them and keep going.
    pub fn load(schema_dir: &Path) -> (Self, Vec<SchemaLoadFailure>) {
        let mut schemas = Self::default();
        let mut failures = Vec::new();
        for entry_type in EntryType::ALL {
            let path = schema_path(schema_dir, entry_type);
            if !path.is_file() {
                continue;
            }
            match load_json_schema(&path) {
                Ok(compiled) => {
                    debug!(path = %path.display(), "compiled descriptor schema");
                    schemas.compiled.insert(entry_type, compiled);
                }
                Err(error) => failures.push(SchemaLoadFailure { path, error }),
            }
        }
        (schemas, failures)
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Validate a descriptor document; returns one message per violation.
    /// An empty vec means the document passed or no schema applies.
    pub fn check(&self, entry_type: EntryType, document: &serde_yaml::Value) -> Vec<String> {
        let Some(schema) = self.compiled.get(&entry_type) else {
            return Vec::new();
        };
        let instance: Value = match serde_json::to_value(document) {
            Ok(value) => value,
            Err(err) => return vec![format!("schema: document is not representable as JSON: {err}")],
        };
        match schema.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    let location = if pointer.is_empty() { "/".to_string() } else { pointer };
                    format!("schema: {err} (at {location})")
                })
                .collect(),
        }
    }
}

pub fn schema_path(schema_dir: &Path, entry_type: EntryType) -> PathBuf {
    schema_dir.join(format!("{}.schema.json", entry_type.as_str()))
}

pub(crate) fn load_json_schema(path: &Path) -> Result<JSONSchema> {
    let schema: Value = serde_json::from_reader(
        File::open(path).with_context(|| format!("opening schema {}", path.display()))?,
    )
    .with_context(|| format!("parsing schema {}", path.display()))?;

    JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling schema {}: {err}", path.display()))
}
