//! Formula store and expander for pipeline path formulas.
//!
//! Formulas are named path templates such as
//! `pr_base_dir = ({pipe_base_dir}, 'projects', {project})`. The store reads
//! them from a base source plus optional project and asset sources, and the
//! expander cleans them and inlines references to other formulas, leaving
//! only runtime tokens (`{drive}`, `{project}`, ...) for the resolver.

pub mod expander;
pub mod source;
pub mod store;
pub mod types;

pub use source::{FileSource, FormulaSource, TextSource};
pub use store::{FormulaStore, NamespaceFilter};
pub use types::{FormulaDefinition, FormulaError, FormulaTable, Namespace};
