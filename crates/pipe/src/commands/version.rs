//! `pipe version` -- print version and platform.

use anyhow::Result;
use pipe_context::Platform;

use crate::context::RuntimeContext;
use crate::output::output_json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execute the `pipe version` command.
pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    let drive = Platform::current().default_drive();

    if ctx.json {
        output_json(&serde_json::json!({
            "version": VERSION,
            "os": os,
            "arch": arch,
            "default_drive": drive,
        }));
    } else {
        println!("pipe version {VERSION} {os}/{arch}");
    }
    Ok(())
}
