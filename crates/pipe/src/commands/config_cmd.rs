//! `pipe config` -- show the effective configuration.

use anyhow::Result;
use pipe_config::config::UnresolvedPolicy;

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `pipe config` command.
pub fn run(ctx: &RuntimeContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => run_show(ctx),
        ConfigCommands::Path => run_path(ctx),
    }
}

fn run_show(ctx: &RuntimeContext) -> Result<()> {
    if ctx.json {
        output_json(&serde_json::json!({
            "pipe_dir": ctx.pipe_dir,
            "config": ctx.config,
            "formulas_dir": ctx.formulas_dir,
            "strict": ctx.strict,
        }));
        return Ok(());
    }

    let cfg = &ctx.config;
    let on_unresolved = match cfg.resolution.on_unresolved {
        UnresolvedPolicy::Warn => "warn",
        UnresolvedPolicy::Error => "error",
    };
    let rows = vec![
        row("drive", cfg.drive.clone().unwrap_or_else(|| "(platform default)".into())),
        row("context_area", cfg.context_area.clone()),
        row(
            "formulas.dir",
            ctx.formulas_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "(built-in)".into()),
        ),
        row("resolution.on_unresolved", on_unresolved.to_string()),
        row("resolution.create_paths", cfg.resolution.create_paths.to_string()),
    ];
    output_table(&["KEY", "VALUE"], &rows);
    Ok(())
}

fn run_path(ctx: &RuntimeContext) -> Result<()> {
    if ctx.json {
        output_json(&serde_json::json!({ "pipe_dir": ctx.pipe_dir }));
    } else {
        match &ctx.pipe_dir {
            Some(dir) => println!("{}", dir.display()),
            None if !ctx.quiet => println!("No .pipe directory found; using defaults."),
            None => {}
        }
    }
    Ok(())
}

fn row(key: &str, value: String) -> Vec<String> {
    vec![key.to_string(), value]
}
