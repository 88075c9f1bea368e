//! `pipe` -- resolve pipeline formulas into paths.
//!
//! Parses CLI arguments with clap, builds the runtime context, and
//! dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet);

    let result = RuntimeContext::from_global_args(&cli.global).and_then(|ctx| match cli.command {
        Some(Commands::Path(args)) => commands::path::run(&ctx, &args),
        Some(Commands::Formula(args)) => commands::formula::run(&ctx, &args),
        Some(Commands::Config(args)) => commands::config_cmd::run(&ctx, &args),
        Some(Commands::Init(args)) => commands::init::run(&ctx, &args),
        Some(Commands::Completion(args)) => commands::completion::run(&args),
        Some(Commands::Version) => commands::version::run(&ctx),
        None => {
            // No subcommand -- print help
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    });

    // Handle errors: print message and exit with code 1
    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Log to stderr. Warnings (dropped tokens, unknown formulas) show by
/// default; `-v` adds resolution traces and `-q` keeps errors only.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "pipe=debug,pipe_context=debug,pipe_formula=debug,pipe_config=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
