//! Formula store: reads the base, project and asset sources and keeps the
//! definition lines that apply to a request.

use std::path::Path;

use tracing::debug;

use crate::expander;
use crate::source::{
    ASSET_FILE, FileSource, FormulaSource, PIPELINE_FILE, PROJECT_FILE, TextSource, builtin,
};
use crate::types::{ASSET_PREFIX, COMMENT_MARKER, FormulaTable, PROJECT_PREFIX, Result};

/// Which optional sources a request needs. The base source is always read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceFilter {
    pub project: bool,
    pub asset: bool,
}

impl NamespaceFilter {
    /// Read every source.
    pub fn all() -> Self {
        Self {
            project: true,
            asset: true,
        }
    }

    /// Only the base source.
    pub fn base_only() -> Self {
        Self {
            project: false,
            asset: false,
        }
    }

    /// Derive the filter from the formula names of a request.
    ///
    /// A name containing `pr_` pulls in the project source and one containing
    /// `as_` the asset source (anywhere in the name, so `pr_as_type_dir`
    /// needs both). No names at all means a full load.
    pub fn for_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::base_only();
        let mut any = false;
        for name in names {
            let name = name.as_ref();
            any = true;
            filter.project |= name.contains(PROJECT_PREFIX);
            filter.asset |= name.contains(ASSET_PREFIX);
        }
        if any { filter } else { Self::all() }
    }
}

/// The three formula sources of a pipeline.
#[derive(Debug)]
pub struct FormulaStore {
    base: Box<dyn FormulaSource>,
    project: Box<dyn FormulaSource>,
    asset: Box<dyn FormulaSource>,
}

impl FormulaStore {
    pub fn new(
        base: impl FormulaSource + 'static,
        project: impl FormulaSource + 'static,
        asset: impl FormulaSource + 'static,
    ) -> Self {
        Self {
            base: Box::new(base),
            project: Box::new(project),
            asset: Box::new(asset),
        }
    }

    /// Store backed by the standard formula files inside `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(
            FileSource::new(dir.join(PIPELINE_FILE)),
            FileSource::new(dir.join(PROJECT_FILE)),
            FileSource::new(dir.join(ASSET_FILE)),
        )
    }

    /// Store backed by the formulas compiled into this crate.
    pub fn builtin() -> Self {
        Self::new(
            TextSource::new(format!("builtin:{PIPELINE_FILE}"), builtin::PIPELINE),
            TextSource::new(format!("builtin:{PROJECT_FILE}"), builtin::PROJECT),
            TextSource::new(format!("builtin:{ASSET_FILE}"), builtin::ASSET),
        )
    }

    /// Raw definition lines for `filter`, in read order: base, project, asset.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Configuration`](crate::types::FormulaError) if
    /// any required source cannot be read.
    pub fn load(&self, filter: NamespaceFilter) -> Result<Vec<String>> {
        let mut lines = keep_lines(&self.base.read()?, ",");
        if filter.project {
            lines.extend(keep_lines(&self.project.read()?, PROJECT_PREFIX));
        }
        if filter.asset {
            lines.extend(keep_lines(&self.asset.read()?, ASSET_PREFIX));
        }
        debug!(
            base = %self.base.describe(),
            project = filter.project,
            asset = filter.asset,
            count = lines.len(),
            "loaded formula definitions"
        );
        Ok(lines)
    }

    /// Load and expand in one step.
    pub fn table(&self, filter: NamespaceFilter) -> Result<FormulaTable> {
        let lines = self.load(filter)?;
        Ok(expander::expand(&lines))
    }
}

/// Trimmed lines containing `delimiter` and no comment marker.
fn keep_lines(text: &str, delimiter: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.contains(delimiter) && !line.contains(COMMENT_MARKER))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FormulaError;
    use pretty_assertions::assert_eq;

    fn store(base: &str, project: &str, asset: &str) -> FormulaStore {
        FormulaStore::new(
            TextSource::new("base", base),
            TextSource::new("project", project),
            TextSource::new("asset", asset),
        )
    }

    #[test]
    fn filter_from_names() {
        assert_eq!(NamespaceFilter::for_names(["pipe_base_dir"]), NamespaceFilter::base_only());
        assert_eq!(
            NamespaceFilter::for_names(["pr_base_dir"]),
            NamespaceFilter { project: true, asset: false }
        );
        assert_eq!(NamespaceFilter::for_names(["pr_as_type_dir"]), NamespaceFilter::all());
        assert_eq!(NamespaceFilter::for_names(Vec::<String>::new()), NamespaceFilter::all());
    }

    #[test]
    fn comment_lines_are_dropped_even_when_delimited() {
        let s = store(
            "# pipe_old_dir = ({drive}, 'old')\npipe_base_dir = ({drive},)\npipe_x = ({drive}, 'x') # trailing",
            "",
            "",
        );
        let lines = s.load(NamespaceFilter::base_only()).unwrap();
        assert_eq!(lines, vec!["pipe_base_dir = ({drive},)".to_string()]);
    }

    #[test]
    fn base_keeps_only_comma_lines() {
        let s = store("pipe_root = {drive}\n  pipe_base_dir = ({drive},)  \n\n", "", "");
        assert_eq!(
            s.load(NamespaceFilter::base_only()).unwrap(),
            vec!["pipe_base_dir = ({drive},)".to_string()]
        );
    }

    #[test]
    fn project_and_asset_sources_are_conditional() {
        let s = store(
            "pipe_base_dir = ({drive},)",
            "pr_base_dir = ({pipe_base_dir}, 'projects', {project})\nunrelated = ('x',)",
            "as_base_dir = ({pr_as_type_dir}, {asset})",
        );
        assert_eq!(s.load(NamespaceFilter::base_only()).unwrap().len(), 1);

        let project = s.load(NamespaceFilter { project: true, asset: false }).unwrap();
        assert_eq!(project.len(), 2);
        assert!(project[1].starts_with("pr_base_dir"));

        let all = s.load(NamespaceFilter::all()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[2].starts_with("as_base_dir"));
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let s = store("pipe_base_dir = ({drive},)\npipe_base_dir = ('/srv',)", "", "");
        assert_eq!(s.load(NamespaceFilter::base_only()).unwrap().len(), 2);
        let table = s.table(NamespaceFilter::base_only()).unwrap();
        assert_eq!(table.get("pipe_base_dir"), Some("/srv"));
    }

    #[test]
    fn unreadable_optional_source_fails_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PIPELINE_FILE), "pipe_base_dir = ({drive},)\n").unwrap();
        let s = FormulaStore::from_dir(dir.path());

        assert!(s.load(NamespaceFilter::base_only()).is_ok());
        let err = s.load(NamespaceFilter::all()).unwrap_err();
        assert!(matches!(err, FormulaError::Configuration { .. }));
        assert!(err.to_string().contains(PROJECT_FILE));
    }

    #[test]
    fn builtin_table_expands_full_chain() {
        let table = FormulaStore::builtin().table(NamespaceFilter::all()).unwrap();
        assert_eq!(
            table.get("as_tex_dir"),
            Some("{drive} projects {project} assets {asset_type} {asset} surfacing textures")
        );
        assert_eq!(table.disk_type(), Some("work"));
    }
}
