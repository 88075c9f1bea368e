//! Runtime context for command execution.
//!
//! The [`RuntimeContext`] holds what a command handler needs: the global
//! flags, the discovered `.pipe/` directory and the loaded configuration.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use pipe_config::config::{PipeConfig, UnresolvedPolicy, load_config};
use pipe_config::pipe_dir::find_pipe_dir;
use pipe_context::{PathResolver, ResolveOptions, TokenMode};
use pipe_formula::FormulaStore;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Discovered `.pipe/` directory, if any.
    pub pipe_dir: Option<PathBuf>,

    /// Layered configuration.
    pub config: PipeConfig,

    /// Formula directory: `--formulas`, then the config. `None` means the
    /// built-in formulas.
    pub formulas_dir: Option<PathBuf>,

    /// Fail on unresolved tokens.
    pub strict: bool,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Build a `RuntimeContext` from parsed global arguments.
    ///
    /// `--strict` wins over `resolution.on_unresolved`, and `--formulas`
    /// over `formulas.dir`.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = env::current_dir().context("failed to get current directory")?;
        let pipe_dir = find_pipe_dir(&cwd);
        let config = load_config(pipe_dir.as_deref()).context("failed to load configuration")?;
        let formulas_dir = global
            .formulas
            .clone()
            .or_else(|| config.formulas_dir(pipe_dir.as_deref()));
        let strict = global.strict || config.resolution.on_unresolved == UnresolvedPolicy::Error;
        debug!(?pipe_dir, ?formulas_dir, strict, "runtime context");

        Ok(Self {
            pipe_dir,
            config,
            formulas_dir,
            strict,
            json: global.json,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    /// The formula store selected by flags and configuration.
    pub fn store(&self) -> FormulaStore {
        match &self.formulas_dir {
            Some(dir) => FormulaStore::from_dir(dir),
            None => FormulaStore::builtin(),
        }
    }

    /// Resolver options; `create` adds to `resolution.create_paths`.
    pub fn resolve_options(&self, create: bool) -> ResolveOptions {
        ResolveOptions {
            tokens: if self.strict {
                TokenMode::Strict
            } else {
                TokenMode::Lenient
            },
            create: create || self.config.resolution.create_paths,
        }
    }

    pub fn resolver(&self, create: bool) -> PathResolver {
        PathResolver::new(self.store()).with_options(self.resolve_options(create))
    }
}
