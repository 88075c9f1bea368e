//! Resolution context and path resolver for pipeline formulas.
//!
//! [`PathResolver::get_path`] is the entry point: it loads the formulas a
//! request needs, opens a [`PipeContext`] session from the caller's
//! variables, and evaluates parent formulas and then the requested ones,
//! each result narrowing the context for the next.
//!
//! ```no_run
//! use pipe_context::{Variables, get_path};
//!
//! let mut vars = Variables::new();
//! vars.insert("drive".into(), "/home/user/pipeline".into());
//! vars.insert("project".into(), "avengers".into());
//! let path = get_path("pr_base_dir", &[], &vars).unwrap();
//! assert_eq!(path.as_deref(), Some("/home/user/pipeline/projects/avengers"));
//! ```

pub mod context;
pub mod enums;
pub mod path;
pub mod resolver;

pub use context::{ContextField, ContextVars, PipeContext, Session, Variables};
pub use enums::{DiskType, Discipline, Platform};
pub use resolver::{
    FormulaRequest, PathResolver, ResolveError, ResolveOptions, TokenMode, get_path,
};
