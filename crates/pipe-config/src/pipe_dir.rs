//! Locating the `.pipe/` directory of a pipeline checkout.
//!
//! `.pipe/` holds the settings files and, after `pipe init`, an editable
//! copy of the formulas under `formulas/`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{CONFIG_TOML, CONFIG_YAML, ConfigError};

/// The name of the pipe metadata directory.
pub const PIPE_DIR_NAME: &str = ".pipe";

/// Environment variable naming the `.pipe/` directory to use.
pub const PIPE_DIR_ENV: &str = "PIPE_DIR";

/// The nearest `.pipe/` at or above `start`.
///
/// `PIPE_DIR` wins when it names an existing directory.
///
/// ```no_run
/// use pipe_config::pipe_dir::find_pipe_dir;
/// use std::path::Path;
///
/// if let Some(dir) = find_pipe_dir(Path::new(".")) {
///     println!("settings in {}", dir.display());
/// }
/// ```
pub fn find_pipe_dir(start: &Path) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(PIPE_DIR_ENV).map(PathBuf::from) {
        if dir.is_dir() {
            debug!(dir = %dir.display(), "pipe dir from PIPE_DIR");
            return Some(dir);
        }
    }

    let start = start.canonicalize().ok()?;
    let found = start
        .ancestors()
        .map(|dir| dir.join(PIPE_DIR_NAME))
        .find(|candidate| candidate.is_dir());
    debug!(start = %start.display(), ?found, "pipe dir lookup");
    found
}

/// Whether `pipe_dir` already holds a settings file.
pub fn is_initialized(pipe_dir: &Path) -> bool {
    [CONFIG_YAML, CONFIG_TOML]
        .iter()
        .any(|file| pipe_dir.join(file).is_file())
}

/// Create `<dir>/.pipe` (or `dir` itself when it already is a `.pipe`).
pub fn ensure_pipe_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    let pipe_dir = if dir.ends_with(PIPE_DIR_NAME) {
        dir.to_path_buf()
    } else {
        dir.join(PIPE_DIR_NAME)
    };
    std::fs::create_dir_all(&pipe_dir)?;
    Ok(pipe_dir)
}
