//! Typed view of catalog descriptor files.
//!
//! Enum-constrained fields stay as raw strings here; the validator maps them
//! through [`ClosedSet`](crate::catalog::ClosedSet) so an unknown value is a
//! diagnostic instead of a parse failure.

use crate::catalog::EntryType;
use crate::catalog::scan::entry_id;
use crate::error::LoadError;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Fields shared by every entry type.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntryCommon {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub declared_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub profiles: Option<Vec<String>>,
}

impl EntryCommon {
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn profiles(&self) -> &[String] {
        self.profiles.as_deref().unwrap_or_default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Links {
    #[serde(default, deserialize_with = "lenient_string")]
    pub github: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppEntry {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub common: EntryCommon,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub os: Option<Vec<String>>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub install: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FontEntry {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub common: EntryCommon,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub install: Option<Value>,
}

/// One registry write performed by a tweak.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: Option<String>,
    /// `Some(None)` for an explicit null, `None` only when the key is absent.
    /// Both null and the empty string address the key's default value.
    #[serde(default, deserialize_with = "present_string")]
    pub name: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub value_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub default_value: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TweakEntry {
    #[serde(skip)]
    pub id: String,
    #[serde(flatten)]
    pub common: EntryCommon,
    #[serde(default)]
    pub registry: Option<Vec<RegistryEntry>>,
    #[serde(default)]
    pub script: Option<Value>,
}

impl TweakEntry {
    pub fn has_registry(&self) -> bool {
        self.registry.as_ref().is_some_and(|entries| !entries.is_empty())
    }

    pub fn has_script(&self) -> bool {
        self.script.as_ref().is_some_and(is_truthy)
    }
}

/// A parsed descriptor, tagged by the directory it was found under.
#[derive(Clone, Debug)]
pub enum CatalogEntry {
    App(AppEntry),
    Font(FontEntry),
    Tweak(TweakEntry),
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        match self {
            CatalogEntry::App(entry) => &entry.id,
            CatalogEntry::Font(entry) => &entry.id,
            CatalogEntry::Tweak(entry) => &entry.id,
        }
    }

    pub fn common(&self) -> &EntryCommon {
        match self {
            CatalogEntry::App(entry) => &entry.common,
            CatalogEntry::Font(entry) => &entry.common,
            CatalogEntry::Tweak(entry) => &entry.common,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            CatalogEntry::App(_) => EntryType::App,
            CatalogEntry::Font(_) => EntryType::Font,
            CatalogEntry::Tweak(_) => EntryType::Tweak,
        }
    }

    /// `kind` is only meaningful for apps.
    pub fn kind(&self) -> Option<&str> {
        match self {
            CatalogEntry::App(entry) => non_empty(&entry.kind),
            _ => None,
        }
    }

    pub fn links(&self) -> Option<&Links> {
        match self {
            CatalogEntry::App(entry) => entry.links.as_ref(),
            CatalogEntry::Font(entry) => entry.links.as_ref(),
            CatalogEntry::Tweak(_) => None,
        }
    }
}

/// A descriptor file read from disk but not yet bound to a type.
///
/// The raw document is kept around so schema checks see exactly what the
/// author wrote, including fields the typed model ignores.
#[derive(Clone, Debug)]
pub struct Descriptor {
    pub path: PathBuf,
    pub id: String,
    pub document: Value,
}

impl Descriptor {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let data = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_yaml::from_str(&data)?;
        if document.is_null() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            path: path.to_path_buf(),
            id: entry_id(path),
            document,
        })
    }

    pub fn parse(&self, entry_type: EntryType) -> Result<CatalogEntry, LoadError> {
        let document = self.document.clone();
        let entry = match entry_type {
            EntryType::App => {
                let mut entry: AppEntry = serde_yaml::from_value(document)?;
                entry.id = self.id.clone();
                CatalogEntry::App(entry)
            }
            EntryType::Font => {
                let mut entry: FontEntry = serde_yaml::from_value(document)?;
                entry.id = self.id.clone();
                CatalogEntry::Font(entry)
            }
            EntryType::Tweak => {
                let mut entry: TweakEntry = serde_yaml::from_value(document)?;
                entry.id = self.id.clone();
                CatalogEntry::Tweak(entry)
            }
        };
        Ok(entry)
    }
}

/// Read and parse a descriptor in one step.
pub fn load_entry(path: &Path, entry_type: EntryType) -> Result<CatalogEntry, LoadError> {
    Descriptor::read(path)?.parse(entry_type)
}

/// Authoring truthiness: `null`, `false`, `0`, and empty strings count as
/// absent; any list or mapping counts as present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn scalar_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Tagged(tagged) => scalar_to_string(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err(E::custom("invalid type: expected a string"))
        }
    }
}

// A null list item is kept as `null` so closed-set checks reject it.
const NULL_TEXT: &str = "null";

// Authors write `name: 7zip` or `tags: [2fa, 3d]`; YAML types some of these as
// numbers, so scalars are accepted and stringified.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(value) => scalar_to_string(value),
        None => Ok(None),
    }
}

// Distinguishes `name: ~` from a missing `name` key; serde only calls this
// when the key is present.
fn present_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).map(Some)
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| {
                let text = scalar_to_string::<D::Error>(item)?;
                Ok::<_, D::Error>(text.unwrap_or_else(|| NULL_TEXT.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(serde::de::Error::custom("invalid type: expected a list")),
    }
}
