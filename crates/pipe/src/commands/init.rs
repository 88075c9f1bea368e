//! `pipe init` -- create a `.pipe` directory in the current directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use pipe_config::config::{CONFIG_YAML, PipeConfig, save_config};
use pipe_config::pipe_dir::{PIPE_DIR_NAME, ensure_pipe_dir, is_initialized};
use pipe_formula::source::{ASSET_FILE, PIPELINE_FILE, PROJECT_FILE, builtin};

use crate::cli::InitArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Formula directory created inside `.pipe/`.
const FORMULAS_DIR: &str = "formulas";

/// Execute the `pipe init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let existing = cwd.join(PIPE_DIR_NAME);

    if !args.force && is_initialized(&existing) {
        bail!(
            "Found existing configuration in {}\n\n\
            This directory is already initialized. Use --force to overwrite.",
            existing.display()
        );
    }

    let pipe_dir = ensure_pipe_dir(&cwd)
        .with_context(|| format!("failed to create {}", existing.display()))?;

    let mut config = PipeConfig::default();
    config.drive = args.drive.clone();
    config.formulas.dir = Some(PathBuf::from(FORMULAS_DIR));
    save_config(&pipe_dir, &config).context("failed to write config")?;

    let written = write_formulas(&pipe_dir.join(FORMULAS_DIR), args.force)?;

    if ctx.json {
        output_json(&serde_json::json!({
            "pipe_dir": pipe_dir,
            "config": pipe_dir.join(CONFIG_YAML),
            "formulas": written,
        }));
    } else if !ctx.quiet {
        println!("Initialized pipe in {}", pipe_dir.display());
        for file in &written {
            println!("  wrote {}", file.display());
        }
    }
    Ok(())
}

/// Write the built-in formula files into `dir`, keeping existing ones
/// unless `force` is set. Returns the files written.
fn write_formulas(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let mut written = Vec::new();
    for (file, text) in [
        (PIPELINE_FILE, builtin::PIPELINE),
        (PROJECT_FILE, builtin::PROJECT),
        (ASSET_FILE, builtin::ASSET),
    ] {
        let path = dir.join(file);
        if path.exists() && !force {
            continue;
        }
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
