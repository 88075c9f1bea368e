//! Where raw formula text comes from.
//!
//! A [`FormulaSource`] hands back the full text of one configuration source.
//! The store decides which lines of it to keep.

use std::path::{Path, PathBuf};

use crate::types::{FormulaError, Result};

/// File name of the base (pipeline) formula source.
pub const PIPELINE_FILE: &str = "pipeline_formulas.cfg";

/// File name of the project formula source.
pub const PROJECT_FILE: &str = "project_formulas.cfg";

/// File name of the asset formula source.
pub const ASSET_FILE: &str = "asset_formulas.cfg";

/// A readable body of formula definitions.
pub trait FormulaSource: std::fmt::Debug {
    /// Human-readable description, used in errors and logs.
    fn describe(&self) -> String;

    /// Read the whole source.
    fn read(&self) -> Result<String>;
}

/// A formula file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FormulaSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|cause| FormulaError::Configuration {
            source_name: self.describe(),
            cause,
        })
    }
}

/// Formula text held in memory (embedded defaults, tests).
#[derive(Debug, Clone)]
pub struct TextSource {
    name: String,
    text: String,
}

impl TextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl FormulaSource for TextSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Default formulas shipped with the crate.
pub mod builtin {
    pub const PIPELINE: &str = include_str!("../data/formulas/pipeline_formulas.cfg");
    pub const PROJECT: &str = include_str!("../data/formulas/project_formulas.cfg");
    pub const ASSET: &str = include_str!("../data/formulas/asset_formulas.cfg");
}
