//! Output formatting helpers for the `pipe` CLI.

use std::env;
use std::io::{self, Write};

use crossterm::tty::IsTty;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a simple table with headers and rows.
///
/// Column widths are computed from the data for alignment.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let _ = writeln!(handle, "{}", format_row(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(handle, "{}", format_row(&rule, &widths));
    for row in rows {
        let _ = writeln!(handle, "{}", format_row(row, &widths));
    }
}

/// Pad cells to `widths`; the last column is not padded.
fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let last = cells.len().saturating_sub(1);
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) if i < last => format!("{:<width$}", cell.as_ref(), width = *width),
            _ => cell.as_ref().to_string(),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Print a highlighted `label: value` line.
pub fn print_block(label: &str, value: &str) {
    if color_enabled(env::var_os("NO_COLOR").is_some(), io::stdout().is_tty()) {
        println!("{} {}", format!("{label}:").bold().cyan(), value);
    } else {
        println!("{label}: {value}");
    }
}

/// Color only on a terminal, and never when `NO_COLOR` is set.
fn color_enabled(no_color: bool, tty: bool) -> bool {
    !no_color && tty
}
