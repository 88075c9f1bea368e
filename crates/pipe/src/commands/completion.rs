//! `pipe completion` -- generate shell completions.
//!
//! Uses `clap_complete` to write a Bash, Zsh, Fish or PowerShell script for
//! the `pipe` command to stdout, e.g. `pipe completion zsh > _pipe`.

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::{Cli, CompletionArgs, CompletionCommands};

/// Execute the `pipe completion` command.
pub fn run(args: &CompletionArgs) -> Result<()> {
    let shell = match &args.command {
        CompletionCommands::Bash => Shell::Bash,
        CompletionCommands::Zsh => Shell::Zsh,
        CompletionCommands::Fish => Shell::Fish,
        CompletionCommands::Powershell => Shell::PowerShell,
    };

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "pipe", &mut std::io::stdout());
    Ok(())
}
