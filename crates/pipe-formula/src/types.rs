//! Formula data model: namespaces, raw definitions, the expanded table, and
//! the errors shared by the store and the expander.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Prefix of global pipeline formulas.
pub const PIPELINE_PREFIX: &str = "pipe_";

/// Prefix of project formulas.
pub const PROJECT_PREFIX: &str = "pr_";

/// Prefix of asset formulas.
pub const ASSET_PREFIX: &str = "as_";

/// Comment marker. A configuration line containing it is never loaded.
pub const COMMENT_MARKER: char = '#';

/// Which scope a formula belongs to, as encoded by its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// `pipe_` formulas, always loaded.
    Pipeline,
    /// `pr_` formulas from the project source.
    Project,
    /// `as_` formulas from the asset source.
    Asset,
    /// Unprefixed helpers living in the base source (e.g. `disk_type`).
    Generic,
}

impl Namespace {
    /// Classify a formula name by its prefix.
    pub fn of(name: &str) -> Self {
        if name.starts_with(PIPELINE_PREFIX) {
            Self::Pipeline
        } else if name.starts_with(PROJECT_PREFIX) {
            Self::Project
        } else if name.starts_with(ASSET_PREFIX) {
            Self::Asset
        } else {
            Self::Generic
        }
    }

    /// The name prefix, if the namespace has one.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Pipeline => Some(PIPELINE_PREFIX),
            Self::Project => Some(PROJECT_PREFIX),
            Self::Asset => Some(ASSET_PREFIX),
            Self::Generic => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipe",
            Self::Project => "pr",
            Self::Asset => "as",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A formula exactly as written in a configuration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaDefinition {
    pub name: String,
    pub raw_template: String,
}

impl FormulaDefinition {
    /// Split a configuration line on `" = "`.
    ///
    /// Returns `None` when the line has no separator. Anything after a second
    /// separator is discarded.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(" = ");
        let name = parts.next()?;
        let raw_template = parts.next()?;
        Some(Self {
            name: name.to_string(),
            raw_template: raw_template.to_string(),
        })
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::of(&self.name)
    }
}

/// Name -> template mapping, remembering the order names first appeared in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaTable {
    #[serde(skip)]
    order: Vec<String>,
    #[serde(flatten)]
    values: HashMap<String, String>,
}

impl FormulaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a formula. Overwriting keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.values.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Formula names in first-appearance order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// `(name, value)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.values[name].as_str()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The path pieces of a formula: its value split on whitespace.
    pub fn pieces(&self, name: &str) -> Option<Vec<&str>> {
        self.get(name).map(|value| value.split_whitespace().collect())
    }

    /// Value of the `disk_type` formula, when the configuration defines one.
    pub fn disk_type(&self) -> Option<&str> {
        self.get("disk_type")
    }

    pub(crate) fn set(&mut self, name: &str, value: String) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
    }
}

/// Errors raised while loading formula definitions.
#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    /// A formula source could not be read.
    #[error("cannot read formula source {source_name}: {cause}")]
    Configuration {
        /// Description of the source (usually its path).
        source_name: String,
        #[source]
        cause: std::io::Error,
    },
}

/// A specialized `Result` type for formula operations.
pub type Result<T> = std::result::Result<T, FormulaError>;
