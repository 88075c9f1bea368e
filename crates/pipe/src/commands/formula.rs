//! `pipe formula` -- inspect the loaded formulas.

use anyhow::{Context, Result, bail};
use pipe_context::ContextField;
use pipe_formula::expander::extract_tokens;
use pipe_formula::{FormulaTable, Namespace, NamespaceFilter};
use serde::Serialize;

use crate::cli::{FormulaArgs, FormulaCommands, FormulaListArgs, FormulaShowArgs};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table, print_block};

const NAMESPACES: [Namespace; 4] = [
    Namespace::Pipeline,
    Namespace::Project,
    Namespace::Asset,
    Namespace::Generic,
];

/// Execute the `pipe formula` command.
pub fn run(ctx: &RuntimeContext, args: &FormulaArgs) -> Result<()> {
    match &args.command {
        FormulaCommands::List(list_args) => run_list(ctx, list_args),
        FormulaCommands::Show(show_args) => run_show(ctx, show_args),
    }
}

#[derive(Debug, Serialize)]
struct FormulaRow<'a> {
    name: &'a str,
    namespace: Namespace,
    value: &'a str,
}

fn load_all(ctx: &RuntimeContext) -> Result<FormulaTable> {
    let store = ctx.store();
    store
        .table(NamespaceFilter::all())
        .context("failed to load formulas")
}

fn run_list(ctx: &RuntimeContext, args: &FormulaListArgs) -> Result<()> {
    let wanted = args.namespace.as_deref().map(parse_namespace).transpose()?;
    let table = load_all(ctx)?;

    let rows: Vec<FormulaRow<'_>> = table
        .iter()
        .map(|(name, value)| FormulaRow {
            name,
            namespace: Namespace::of(name),
            value,
        })
        .filter(|row| wanted.is_none_or(|ns| row.namespace == ns))
        .collect();

    if ctx.json {
        output_json(&rows);
        return Ok(());
    }
    if rows.is_empty() {
        if !ctx.quiet {
            println!("No formulas found.");
        }
        return Ok(());
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.name.to_string(), r.namespace.to_string(), r.value.to_string()])
        .collect();
    output_table(&["NAME", "NAMESPACE", "VALUE"], &cells);
    Ok(())
}

#[derive(Debug, Serialize)]
struct TokenInfo<'a> {
    token: &'a str,
    /// Filled by the context rather than a caller variable.
    context_field: bool,
}

fn run_show(ctx: &RuntimeContext, args: &FormulaShowArgs) -> Result<()> {
    let table = load_all(ctx)?;
    let Some(value) = table.get(&args.name) else {
        bail!("formula '{}' not found", args.name);
    };
    let pieces = table.pieces(&args.name).unwrap_or_default();
    let tokens: Vec<TokenInfo<'_>> = extract_tokens(value)
        .into_iter()
        .map(|token| TokenInfo {
            token,
            context_field: ContextField::from_token(token).is_some(),
        })
        .collect();

    if ctx.json {
        output_json(&serde_json::json!({
            "name": args.name,
            "namespace": Namespace::of(&args.name),
            "value": value,
            "pieces": pieces,
            "tokens": tokens,
        }));
        return Ok(());
    }

    print_block("Formula", &args.name);
    println!("Namespace: {}", Namespace::of(&args.name));
    println!("Value:     {value}");
    println!("Pieces:    {}", pieces.join(" | "));
    if !tokens.is_empty() {
        let names: Vec<String> = tokens
            .iter()
            .map(|t| {
                if t.context_field {
                    format!("{{{}}}", t.token)
                } else {
                    format!("{{{}}} (caller)", t.token)
                }
            })
            .collect();
        println!("Tokens:    {}", names.join(", "));
    }
    Ok(())
}

fn parse_namespace(s: &str) -> Result<Namespace> {
    let lower = s.trim().trim_end_matches('_').to_ascii_lowercase();
    match NAMESPACES.into_iter().find(|ns| ns.as_str() == lower) {
        Some(ns) => Ok(ns),
        None => bail!("unknown namespace '{s}' (expected one of: pipe, pr, as, generic)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_parse_by_prefix() {
        assert_eq!(parse_namespace("pr").unwrap(), Namespace::Project);
        assert_eq!(parse_namespace("as_").unwrap(), Namespace::Asset);
        assert_eq!(parse_namespace("PIPE").unwrap(), Namespace::Pipeline);
        assert_eq!(parse_namespace("generic").unwrap(), Namespace::Generic);
        assert!(parse_namespace("shot").is_err());
    }
}
