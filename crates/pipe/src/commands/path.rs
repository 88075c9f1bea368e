//! `pipe path` -- resolve formulas to a path.

use anyhow::{Context, Result, bail};
use pipe_context::{
    ContextField, Discipline, DiskType, FormulaRequest, PipeContext, ResolveError, Variables,
};
use tracing::debug;

use crate::cli::PathArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `pipe path` command.
pub fn run(ctx: &RuntimeContext, args: &PathArgs) -> Result<()> {
    let vars = build_vars(ctx, args)?;
    debug!(?vars, "resolution variables");

    let request = if args.formulas.len() == 1 {
        FormulaRequest::One(args.formulas[0].clone())
    } else {
        FormulaRequest::Batch(args.formulas.clone())
    };
    let parents: Vec<&str> = args.parents.iter().map(String::as_str).collect();

    let resolver = ctx.resolver(args.create);
    let path = resolver
        .get_path(request.clone(), &parents, &vars)
        .with_context(|| format!("failed to resolve {request}"))?;
    let Some(path) = path else {
        return Err(ResolveError::UnknownFormula(request.to_string()).into());
    };

    let shown = match &args.relative_to {
        Some(base) => {
            let mut here = PipeContext::new(&vars);
            here.set_current(base.as_str());
            here.relpath(&path).unwrap_or(path)
        }
        None => path,
    };

    if ctx.json {
        output_json(&serde_json::json!({
            "formulas": args.formulas,
            "parents": args.parents,
            "path": shown,
        }));
    } else {
        println!("{shown}");
    }
    Ok(())
}

/// Collect resolution variables.
///
/// Config values come first, then `--var` pairs, then the named flags.
fn build_vars(ctx: &RuntimeContext, args: &PathArgs) -> Result<Variables> {
    let mut vars = Variables::new();
    if let Some(drive) = &ctx.config.drive {
        vars.insert(ContextField::Drive.token().to_string(), drive.clone());
    }
    vars.insert(
        ContextField::ContextArea.token().to_string(),
        ctx.config.context_area.clone(),
    );

    for pair in &args.vars {
        let (key, value) = parse_var(pair)?;
        vars.insert(key.to_string(), value.to_string());
    }

    let discipline = args
        .discipline
        .as_deref()
        .map(|d| d.parse::<Discipline>().map(|d| d.long().to_string()))
        .transpose()?;
    let disk_type = args
        .disk_type
        .as_deref()
        .map(|d| d.parse::<DiskType>().map(|d| d.as_str().to_string()))
        .transpose()?;

    let named = [
        (ContextField::Drive, args.drive.clone()),
        (ContextField::Project, args.project.clone()),
        (ContextField::Asset, args.asset.clone()),
        (ContextField::AssetType, args.asset_type.clone()),
        (ContextField::ContextArea, discipline.or_else(|| args.context_area.clone())),
        (ContextField::DiskType, disk_type),
    ];
    for (field, value) in named {
        if let Some(value) = value {
            vars.insert(field.token().to_string(), value);
        }
    }
    Ok(vars)
}

fn parse_var(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("invalid --var '{pair}' (expected KEY=VALUE)"),
    }
}
