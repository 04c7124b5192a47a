//! Category taxonomy loading.
//!
//! `categories.yaml` is a mapping of category ids to optional metadata, where
//! any node may carry a nested `children` mapping. The loader flattens it into
//! the set of slash-joined paths (`Development/Editors`) that descriptors may
//! reference. Being a mapping of mappings, the document cannot express cycles.

use anyhow::{Context, Result, bail};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const CATEGORY_SEPARATOR: char = '/';

const CHILDREN_KEY: &str = "children";

/// Raw taxonomy document. Node values are arbitrary metadata; only a
/// mapping-valued `children` entry inside a mapping node is descended into.
pub type CategoryTree = Mapping;

/// Flattened, immutable set of valid category paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySet {
    paths: BTreeSet<String>,
}

impl CategorySet {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading categories {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing categories {}", path.display()))
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Ok(Self::default()),
            Value::Mapping(tree) => Ok(Self::from_tree(&tree)),
            other => bail!("expected a mapping of categories, found {}", describe(&other)),
        }
    }

    pub fn from_tree(tree: &CategoryTree) -> Self {
        let mut paths = BTreeSet::new();
        flatten(tree, None, &mut paths);
        Self { paths }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

/// The nested `children` mapping of a node, if it has one.
pub fn children_of(node: &Value) -> Option<&Mapping> {
    node.as_mapping()?.get(CHILDREN_KEY)?.as_mapping()
}

fn flatten(tree: &CategoryTree, prefix: Option<&str>, out: &mut BTreeSet<String>) {
    for (key, node) in tree {
        let Some(key) = key_text(key) else {
            continue;
        };
        let full = match prefix {
            Some(prefix) => format!("{prefix}{CATEGORY_SEPARATOR}{key}"),
            None => key,
        };
        if let Some(children) = children_of(node) {
            flatten(children, Some(&full), out);
        }
        out.insert(full);
    }
}

// Scalar keys such as `3D:` or `2024:` still name categories.
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
