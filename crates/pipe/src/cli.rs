//! Clap CLI definitions for the `pipe` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pipe -- resolve pipeline formulas into paths.
#[derive(Parser, Debug)]
#[command(
    name = "pipe",
    about = "Resolve pipeline formulas into paths",
    long_about = "Formulas are named path templates such as pr_base_dir = ({pipe_base_dir}, 'projects', {project}). pipe expands them and fills in drive, project, asset and the other context variables.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory with pipeline_formulas.cfg, project_formulas.cfg and asset_formulas.cfg.
    #[arg(long, global = true)]
    pub formulas: Option<PathBuf>,

    /// Fail on tokens that match no variable (default: drop them with a warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one or more formulas to a path.
    #[command(alias = "get")]
    Path(PathArgs),

    /// Inspect the loaded formulas.
    Formula(FormulaArgs),

    /// Show the effective configuration.
    Config(ConfigArgs),

    /// Create a .pipe directory with a config file and editable formulas.
    Init(InitArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),

    /// Print version information.
    Version,
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// Arguments for `pipe path`.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Formula(s) to resolve. With several, only the last path is printed.
    #[arg(id = "formula_names", value_name = "FORMULAS", required = true)]
    pub formulas: Vec<String>,

    /// Parent formula to resolve first (repeatable, evaluated in order).
    #[arg(short = 'p', long = "parent")]
    pub parents: Vec<String>,

    /// Pipeline root (default: config, then the platform default).
    #[arg(long)]
    pub drive: Option<String>,

    /// Project name.
    #[arg(long)]
    pub project: Option<String>,

    /// Asset name.
    #[arg(long)]
    pub asset: Option<String>,

    /// Asset type.
    #[arg(long)]
    pub asset_type: Option<String>,

    /// Discipline (long or short name), used as the context area.
    #[arg(long, conflicts_with = "context_area")]
    pub discipline: Option<String>,

    /// Context area (free-form).
    #[arg(long)]
    pub context_area: Option<String>,

    /// Disk type (code, config, data, render, store, work).
    #[arg(long)]
    pub disk_type: Option<String>,

    /// Extra variable, KEY=VALUE (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Create the resolved directory.
    #[arg(long)]
    pub create: bool,

    /// Print the path relative to this directory.
    #[arg(long, value_name = "DIR")]
    pub relative_to: Option<String>,
}

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

/// Arguments for `pipe formula`.
#[derive(Args, Debug)]
pub struct FormulaArgs {
    #[command(subcommand)]
    pub command: FormulaCommands,
}

/// Formula subcommands.
#[derive(Subcommand, Debug)]
pub enum FormulaCommands {
    /// List expanded formulas.
    List(FormulaListArgs),
    /// Show one formula: expanded value, pieces and tokens.
    Show(FormulaShowArgs),
}

/// Arguments for `pipe formula list`.
#[derive(Args, Debug)]
pub struct FormulaListArgs {
    /// Only formulas of this namespace (pipe, pr, as).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

/// Arguments for `pipe formula show`.
#[derive(Args, Debug)]
pub struct FormulaShowArgs {
    /// Formula name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Arguments for `pipe config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration.
    Show,
    /// Print the .pipe directory in use.
    Path,
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Arguments for `pipe init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Pipeline root to record in the config.
    #[arg(long)]
    pub drive: Option<String>,

    /// Overwrite existing files.
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `pipe completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Completion subcommands.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate bash completion script.
    Bash,
    /// Generate zsh completion script.
    Zsh,
    /// Generate fish completion script.
    Fish,
    /// Generate PowerShell completion script.
    Powershell,
}
