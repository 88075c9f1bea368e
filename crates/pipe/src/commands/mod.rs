//! Command handlers, one module per subcommand.

pub mod completion;
pub mod config_cmd;
pub mod formula;
pub mod init;
pub mod path;
pub mod version;
