//! Settings of the `pipe` tool.
//!
//! [`PipeConfig`] is layered with figment: built-in defaults, then
//! `.pipe/config.yaml`, then `.pipe/config.toml`, then `PIPE_*` environment
//! variables (`__` separates nested keys, e.g.
//! `PIPE_RESOLUTION__ON_UNRESOLVED=error`).

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// YAML settings file inside `.pipe/`.
pub const CONFIG_YAML: &str = "config.yaml";

/// TOML settings file inside `.pipe/`.
pub const CONFIG_TOML: &str = "config.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PIPE_";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings file could not be read or written.
    #[error("failed to access config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The layered settings could not be extracted.
    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// Settings could not be serialized to YAML.
    #[error("failed to write config file: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// What the resolver does with a token nothing can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop the token and log a warning.
    #[default]
    Warn,
    /// Fail the resolution.
    Error,
}

/// Where formulas are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormulasConfig {
    /// Directory holding `pipeline_formulas.cfg`, `project_formulas.cfg` and
    /// `asset_formulas.cfg`. Relative paths are taken from the `.pipe/`
    /// directory. Unset means the built-in formulas.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Resolution behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub on_unresolved: UnresolvedPolicy,

    /// Create resolved directories on disk.
    #[serde(default)]
    pub create_paths: bool,
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full `pipe` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeConfig {
    /// Root of the pipeline. Unset means the platform default.
    #[serde(default)]
    pub drive: Option<String>,

    /// Default `context_area` token value.
    #[serde(default = "default_context_area")]
    pub context_area: String,

    #[serde(default)]
    pub formulas: FormulasConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            drive: None,
            context_area: default_context_area(),
            formulas: FormulasConfig::default(),
            resolution: ResolutionConfig::default(),
        }
    }
}

fn default_context_area() -> String {
    "pipeline".to_string()
}

impl PipeConfig {
    /// The configured formula directory, anchored at `pipe_dir` when relative.
    pub fn formulas_dir(&self, pipe_dir: Option<&Path>) -> Option<PathBuf> {
        let dir = self.formulas.dir.as_ref()?;
        match pipe_dir {
            Some(base) if dir.is_relative() => Some(base.join(dir)),
            _ => Some(dir.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The figment stack for `pipe_dir` (or defaults and environment only).
pub fn figment(pipe_dir: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(PipeConfig::default()));
    if let Some(dir) = pipe_dir {
        figment = figment
            .merge(Yaml::file(dir.join(CONFIG_YAML)))
            .merge(Toml::file(dir.join(CONFIG_TOML)));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the layered configuration.
///
/// Missing files are skipped, so a bare checkout yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Extract`] if a layer holds invalid values.
pub fn load_config(pipe_dir: Option<&Path>) -> Result<PipeConfig> {
    Ok(figment(pipe_dir).extract()?)
}

/// Save configuration to `config.yaml` inside `pipe_dir`, creating the
/// directory if needed.
pub fn save_config(pipe_dir: &Path, config: &PipeConfig) -> Result<()> {
    std::fs::create_dir_all(pipe_dir)?;
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(pipe_dir.join(CONFIG_YAML), yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
