//! Path resolver: evaluates formulas against a [`PipeContext`].

use std::fmt;

use pipe_formula::expander::first_token;
use pipe_formula::{FormulaError, FormulaStore, FormulaTable, Namespace, NamespaceFilter};
use tracing::{debug, info, warn};

use crate::context::{ContextField, ContextVars, PipeContext, Variables};
use crate::enums::Platform;
use crate::path;

/// What to do with a token that matches neither a variable nor a context
/// field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenMode {
    /// Drop the piece and log a warning.
    #[default]
    Lenient,
    /// Fail the resolution.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub tokens: TokenMode,
    /// Create the final resolved directory on disk.
    pub create: bool,
}

/// One formula or a batch of formulas sharing a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaRequest {
    One(String),
    Batch(Vec<String>),
}

impl FormulaRequest {
    pub fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Batch(names) => names,
        }
    }
}

impl fmt::Display for FormulaRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(name) => f.write_str(name),
            Self::Batch(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

impl From<&str> for FormulaRequest {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<String> for FormulaRequest {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl From<Vec<String>> for FormulaRequest {
    fn from(names: Vec<String>) -> Self {
        Self::Batch(names)
    }
}

impl From<&[&str]> for FormulaRequest {
    fn from(names: &[&str]) -> Self {
        Self::Batch(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FormulaRequest {
    fn from(names: [&str; N]) -> Self {
        Self::Batch(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Errors that can occur while resolving a formula to a path.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("formula '{formula}': token '{{{token}}}' matches no variable or context field")]
    UnresolvedToken { formula: String, token: String },

    /// A `{pipe_*}`, `{pr_*}` or `{as_*}` reference survived expansion:
    /// its formula was not loaded, or it refers to itself.
    #[error(
        "formula '{formula}': reference '{{{reference}}}' was not expanded (formula not loaded or self-referencing)"
    )]
    UnexpandedReference { formula: String, reference: String },

    #[error("unknown formula: {0}")]
    UnknownFormula(String),

    #[error("cannot create directory {path}: {source}")]
    CreatePath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for path resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Resolves formulas from a [`FormulaStore`] into paths.
#[derive(Debug)]
pub struct PathResolver {
    store: FormulaStore,
    options: ResolveOptions,
}

impl PathResolver {
    pub fn new(store: FormulaStore) -> Self {
        Self {
            store,
            options: ResolveOptions::default(),
        }
    }

    /// Resolver over the formulas shipped with `pipe-formula`.
    pub fn builtin() -> Self {
        Self::new(FormulaStore::builtin())
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    pub fn store(&self) -> &FormulaStore {
        &self.store
    }

    /// Load and expand the formulas a request needs.
    pub fn table_for(&self, request: &FormulaRequest, parents: &[&str]) -> Result<FormulaTable> {
        let names = request
            .names()
            .iter()
            .map(String::as_str)
            .chain(parents.iter().copied());
        Ok(self.store.table(NamespaceFilter::for_names(names))?)
    }

    /// Resolve `request` to a path.
    ///
    /// Each requested formula is evaluated in turn inside one context: its
    /// `parents` are resolved first, left to right, then the formula itself,
    /// and every result becomes the new current context. The return value is
    /// the context's final path, so a batch yields only its last path.
    /// `Ok(None)` means none of the requested formulas exist. Without a
    /// caller `disk_type`, the table's `disk_type` formula fills it.
    pub fn get_path(
        &self,
        request: impl Into<FormulaRequest>,
        parents: &[&str],
        vars: &Variables,
    ) -> Result<Option<String>> {
        let request = request.into();
        debug!(formula = %request, "formula requested");
        debug!(?parents, "additional formulas");
        debug!(?vars, "keyword arguments");

        let table = self.table_for(&request, parents)?;
        let mut ctx_vars = ContextVars::from_vars(vars, Platform::current());
        if ctx_vars.disk_type.is_none() {
            ctx_vars.disk_type = table.disk_type().map(str::to_string);
        }
        let mut ctx = PipeContext::from_context_vars(ctx_vars);
        self.get_path_in(&mut ctx, &table, &request, parents, vars)
    }

    /// [`get_path`](Self::get_path) against a caller-owned context and table.
    pub fn get_path_in(
        &self,
        ctx: &mut PipeContext,
        table: &FormulaTable,
        request: &FormulaRequest,
        parents: &[&str],
        vars: &Variables,
    ) -> Result<Option<String>> {
        let mut session = ctx.session();
        let mut found = false;
        for formula in request.names() {
            if self.eval_path(&mut session, table, formula, parents, vars)?.is_some() {
                found = true;
            } else {
                warn!(formula = %formula, "formula not found");
            }
        }
        let current = session.finish();
        if !found {
            return Ok(None);
        }
        if let Some(p) = &current {
            if self.options.create {
                path::create_path(p).map_err(|source| ResolveError::CreatePath {
                    path: p.clone(),
                    source,
                })?;
            }
            info!(path = %p, "found path");
        }
        Ok(current)
    }

    /// Resolve `parents` then `formula`, moving the context along.
    pub fn eval_path(
        &self,
        ctx: &mut PipeContext,
        table: &FormulaTable,
        formula: &str,
        parents: &[&str],
        vars: &Variables,
    ) -> Result<Option<String>> {
        for parent in parents {
            if self.resolve(ctx, table, parent, vars)?.is_none() {
                warn!(parent = %parent, "parent formula not found");
            }
        }
        self.resolve(ctx, table, formula, vars)
    }

    /// Resolve a single formula and make it the current context.
    pub fn resolve(
        &self,
        ctx: &mut PipeContext,
        table: &FormulaTable,
        formula: &str,
        vars: &Variables,
    ) -> Result<Option<String>> {
        let Some(pieces) = table.pieces(formula) else {
            return Ok(None);
        };
        let resolved = self.substitute(formula, &pieces, ctx, vars)?;
        debug!(formula, path = %resolved, "resolved formula");
        ctx.set_current(resolved.clone());
        Ok(Some(resolved))
    }

    /// Replace tokens in `pieces` and join them into a normalized path.
    ///
    /// A piece without `{` is used verbatim. Otherwise its first token is
    /// looked up in `vars`, then in the context. A leftover formula reference
    /// fails in either token mode.
    pub fn substitute(
        &self,
        formula: &str,
        pieces: &[&str],
        ctx: &PipeContext,
        vars: &Variables,
    ) -> Result<String> {
        let mut parts: Vec<&str> = Vec::with_capacity(pieces.len());
        for &piece in pieces {
            if !piece.contains('{') {
                parts.push(piece);
                continue;
            }
            let token = first_token(piece).unwrap_or(piece);
            let value = vars
                .get(token)
                .map(String::as_str)
                .or_else(|| ContextField::from_token(token).and_then(|f| ctx.lookup(f)));
            match value {
                Some(value) => parts.push(value),
                None if Namespace::of(token) != Namespace::Generic => {
                    return Err(ResolveError::UnexpandedReference {
                        formula: formula.to_string(),
                        reference: token.to_string(),
                    });
                }
                None => match self.options.tokens {
                    TokenMode::Lenient => {
                        warn!(formula, token, "dropping unresolved token");
                    }
                    TokenMode::Strict => {
                        return Err(ResolveError::UnresolvedToken {
                            formula: formula.to_string(),
                            token: token.to_string(),
                        });
                    }
                },
            }
        }
        Ok(path::join_pieces(&parts))
    }
}

/// Resolve with the built-in formulas and default options.
pub fn get_path(
    request: impl Into<FormulaRequest>,
    parents: &[&str],
    vars: &Variables,
) -> Result<Option<String>> {
    PathResolver::builtin().get_path(request, parents, vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe_formula::TextSource;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Rewrite a `/`-separated path with the platform separator.
    fn native(p: &str) -> String {
        path::normalize(p)
    }

    fn small_store() -> FormulaStore {
        FormulaStore::new(
            TextSource::new(
                "base",
                "pipe_base_dir = ({drive},)\npipe_lib_dir = ({pipe_base_dir}, 'library')\npipe_fixed = ('srv', 'pipe', 'library')\npipe_shot_dir = ({pipe_base_dir}, {shot}, {missing})",
            ),
            TextSource::new("project", "pr_base_dir = ({pipe_base_dir}, 'projects', {project})"),
            TextSource::new("asset", "as_base_dir = ({pr_base_dir}, 'assets', {asset})\nas_here = ({context}, 'here')"),
        )
    }

    fn scenario_a() -> Variables {
        vars(&[
            ("drive", "/home/user/pipeline"),
            ("project", "avengers"),
            ("asset_type", "alien"),
            ("asset", "nova_prime_soldier.blend"),
        ])
    }

    // -- scenarios ---------------------------------------------------------

    #[test]
    fn single_path() {
        let path = get_path("pr_base_dir", &[], &scenario_a()).unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline/projects/avengers")));
    }

    #[test]
    fn child_path_after_parent() {
        let v = vars(&[
            ("drive", "/home/user/pipeline"),
            ("project", "project_2"),
            ("asset_type", "architecture"),
            ("asset", "empire_state_building"),
        ]);
        let path = get_path("as_base_dir", &["pr_as_type_dir"], &v).unwrap();
        assert_eq!(
            path,
            Some(native(
                "/home/user/pipeline/projects/project_2/assets/architecture/empire_state_building"
            ))
        );
    }

    #[test]
    fn batch_returns_last_path() {
        let v = vars(&[
            ("drive", "/home/user/pipeline"),
            ("project", "Interstellar"),
            ("asset_type", "Vehicles"),
            ("asset", "Endurance"),
        ]);
        let path = get_path(
            ["pipe_base_dir", "pipe_mtlx_dir", "as_tex_dir"],
            &["pr_as_type_dir", "as_geo_dir"],
            &v,
        )
        .unwrap();
        assert_eq!(
            path,
            Some(native(
                "/home/user/pipeline/projects/Interstellar/assets/Vehicles/Endurance/surfacing/textures"
            ))
        );
    }

    // -- properties --------------------------------------------------------

    #[test]
    fn pure_lookup_is_deterministic() {
        let resolver = PathResolver::builtin();
        let first = resolver.get_path("pr_as_dir", &[], &scenario_a()).unwrap();
        let second = resolver.get_path("pr_as_dir", &[], &scenario_a()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn child_extends_parent_path() {
        let resolver = PathResolver::builtin();
        let request = FormulaRequest::from("as_geo_dir");
        let parents = ["pr_base_dir", "as_base_dir"];
        let table = resolver.table_for(&request, &parents).unwrap();
        let v = scenario_a();
        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        let child = resolver
            .get_path_in(&mut ctx, &table, &request, &parents, &v)
            .unwrap()
            .unwrap();
        let parent = ctx.history().last().unwrap().clone();
        assert!(child.starts_with(&parent));
        assert!(child.len() > parent.len());
        assert_eq!(parent, native("/home/user/pipeline/projects/avengers/assets/alien/nova_prime_soldier.blend"));
    }

    #[test]
    fn literal_template_joins_pieces() {
        let resolver = PathResolver::new(small_store());
        let path = resolver.get_path("pipe_fixed", &[], &vars(&[])).unwrap();
        assert_eq!(path, Some(native("srv/pipe/library")));
    }

    #[test]
    fn unknown_formula_is_none() {
        let resolver = PathResolver::new(small_store());
        assert_eq!(resolver.get_path("pipe_nope", &[], &scenario_a()).unwrap(), None);
    }

    #[test]
    fn batch_with_unknown_member_keeps_last_found() {
        let resolver = PathResolver::new(small_store());
        let path = resolver
            .get_path(["pipe_lib_dir", "pipe_nope"], &[], &scenario_a())
            .unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline/library")));
    }

    #[test]
    fn caller_variables_win_over_context_fields() {
        let resolver = PathResolver::new(small_store());
        let request = FormulaRequest::from("pr_base_dir");
        let table = resolver.table_for(&request, &[]).unwrap();
        let ctx_vars = vars(&[("drive", "/ctx"), ("project", "from_ctx")]);
        let mut ctx = PipeContext::with_platform(&ctx_vars, Platform::Other);
        let path = resolver
            .get_path_in(&mut ctx, &table, &request, &[], &vars(&[("project", "from_caller")]))
            .unwrap();
        assert_eq!(path, Some(native("/ctx/projects/from_caller")));
    }

    #[test]
    fn extra_caller_variables_are_substituted() {
        let resolver = PathResolver::new(small_store());
        let mut v = scenario_a();
        v.insert("shot".into(), "sh010".into());
        v.insert("missing".into(), "m".into());
        let path = resolver.get_path("pipe_shot_dir", &[], &v).unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline/sh010/m")));
    }

    #[test]
    fn lenient_mode_drops_unresolved_tokens() {
        let resolver = PathResolver::new(small_store());
        let path = resolver.get_path("pipe_shot_dir", &[], &scenario_a()).unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline")));
    }

    #[test]
    fn strict_mode_rejects_unresolved_tokens() {
        let resolver = PathResolver::new(small_store()).with_options(ResolveOptions {
            tokens: TokenMode::Strict,
            create: false,
        });
        let err = resolver.get_path("pipe_shot_dir", &[], &scenario_a()).unwrap_err();
        match err {
            ResolveError::UnresolvedToken { formula, token } => {
                assert_eq!(formula, "pipe_shot_dir");
                assert_eq!(token, "shot");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parent_failure_propagates() {
        let resolver = PathResolver::new(small_store()).with_options(ResolveOptions {
            tokens: TokenMode::Strict,
            create: false,
        });
        let result = resolver.get_path("pipe_lib_dir", &["pipe_shot_dir"], &scenario_a());
        assert!(matches!(result, Err(ResolveError::UnresolvedToken { .. })));
    }

    #[test]
    fn context_token_follows_parent() {
        let resolver = PathResolver::new(small_store());
        let path = resolver.get_path("as_here", &["pr_base_dir"], &scenario_a()).unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline/projects/avengers/here")));
    }

    #[test]
    fn missing_source_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new(FormulaStore::from_dir(dir.path()));
        let err = resolver.get_path("pipe_base_dir", &[], &scenario_a()).unwrap_err();
        assert!(matches!(err, ResolveError::Formula(FormulaError::Configuration { .. })));
    }

    #[test]
    fn create_option_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let drive = dir.path().to_str().unwrap().to_string();
        let resolver = PathResolver::builtin().with_options(ResolveOptions {
            tokens: TokenMode::Lenient,
            create: true,
        });
        let v = vars(&[("drive", drive.as_str()), ("project", "avengers")]);
        let path = resolver.get_path("pr_base_dir", &[], &v).unwrap().unwrap();
        assert!(std::path::Path::new(&path).is_dir());
    }

    #[test]
    fn batch_history_is_a_chain() {
        let resolver = PathResolver::builtin();
        let request = FormulaRequest::from(["pipe_base_dir", "pr_base_dir"]);
        let table = resolver.table_for(&request, &[]).unwrap();
        let v = scenario_a();
        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        resolver.get_path_in(&mut ctx, &table, &request, &[], &v).unwrap();
        // The drive and pipe_base_dir resolve to the same path: one entry.
        assert_eq!(ctx.history(), &[native("/home/user/pipeline")]);
        assert_eq!(ctx.current(), Some(native("/home/user/pipeline/projects/avengers").as_str()));
    }

    #[test]
    fn asset_formula_without_project_fails() {
        let err = get_path("as_tex_dir", &[], &scenario_a()).unwrap_err();
        match err {
            ResolveError::UnexpandedReference { formula, reference } => {
                assert_eq!(formula, "as_tex_dir");
                assert_eq!(reference, "pr_as_type_dir");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_reference_fails() {
        let store = FormulaStore::new(
            TextSource::new("base", "pipe_loop = ({pipe_loop}, 'x')"),
            TextSource::new("project", ""),
            TextSource::new("asset", ""),
        );
        let err = PathResolver::new(store)
            .get_path("pipe_loop", &[], &scenario_a())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnexpandedReference { ref reference, .. } if reference == "pipe_loop"
        ));
    }

    #[test]
    fn disk_type_falls_back_to_formula() {
        let store = FormulaStore::new(
            TextSource::new("base", "disk_type = ('work',)\npipe_disk_dir = ({drive}, {disk_type})"),
            TextSource::new("project", ""),
            TextSource::new("asset", ""),
        );
        let resolver = PathResolver::new(store);
        let path = resolver.get_path("pipe_disk_dir", &[], &vars(&[("drive", "/d")])).unwrap();
        assert_eq!(path, Some(native("/d/work")));

        let v = vars(&[("drive", "/d"), ("disk_type", "render")]);
        let path = resolver.get_path("pipe_disk_dir", &[], &v).unwrap();
        assert_eq!(path, Some(native("/d/render")));
    }

    #[test]
    fn unknown_parent_leaves_context_unchanged() {
        let resolver = PathResolver::new(small_store());
        let request = FormulaRequest::from("pipe_lib_dir");
        let parents = ["pipe_nope"];
        let table = resolver.table_for(&request, &parents).unwrap();
        let v = scenario_a();

        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        ctx.enter();
        assert_eq!(resolver.resolve(&mut ctx, &table, "pipe_nope", &v).unwrap(), None);
        assert_eq!(ctx.current(), Some("/home/user/pipeline"));
        assert!(ctx.history().is_empty());

        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        let path = resolver
            .get_path_in(&mut ctx, &table, &request, &parents, &v)
            .unwrap();
        assert_eq!(path, Some(native("/home/user/pipeline/library")));
        assert_eq!(ctx.history(), ["/home/user/pipeline".to_string()]);
    }

    #[test]
    fn no_drive_starts_without_base_path() {
        let resolver = PathResolver::new(small_store());
        let v = vars(&[("project", "avengers")]);

        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        assert_eq!(ctx.vars().drive, None);
        let request = FormulaRequest::from("pipe_fixed");
        let table = resolver.table_for(&request, &[]).unwrap();
        let path = resolver.get_path_in(&mut ctx, &table, &request, &[], &v).unwrap();
        assert_eq!(path, Some(native("srv/pipe/library")));
        assert!(ctx.history().is_empty());

        let request = FormulaRequest::from("pipe_lib_dir");
        let mut ctx = PipeContext::with_platform(&v, Platform::Other);
        let path = resolver.get_path_in(&mut ctx, &table, &request, &[], &v).unwrap();
        assert_eq!(path, Some(native("library")));
    }
}
