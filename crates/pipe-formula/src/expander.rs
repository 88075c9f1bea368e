//! Turn raw definition lines into an expanded [`FormulaTable`]:
//! split, clean, then expand formula-to-formula references.

use tracing::{debug, warn};

use crate::types::{ASSET_PREFIX, FormulaDefinition, FormulaTable, PIPELINE_PREFIX, PROJECT_PREFIX};

/// Characters stripped from every template by the clean pass.
const NOISE: [char; 4] = [',', '\'', '(', ')'];

/// Run the split, clean and expand passes over `lines`, in that order.
pub fn expand<S: AsRef<str>>(lines: &[S]) -> FormulaTable {
    let mut table = split(lines);
    clean(&mut table);
    expand_references(&mut table);
    table
}

/// Split pass: `name = value` lines into a table. The last definition of a
/// name wins.
pub fn split<S: AsRef<str>>(lines: &[S]) -> FormulaTable {
    let mut table = FormulaTable::new();
    for line in lines {
        let line = line.as_ref();
        match FormulaDefinition::parse(line) {
            Some(def) => table.insert(def.name, def.raw_template),
            None => warn!(line, "skipping formula line without ' = ' separator"),
        }
    }
    table
}

/// Clean pass: drop tuple/list punctuation and surrounding whitespace.
pub fn clean(table: &mut FormulaTable) {
    let names = table.names().to_vec();
    for name in &names {
        if let Some(value) = table.get(name) {
            let cleaned = clean_value(value);
            table.set(name, cleaned);
        }
    }
}

/// Strip `,` `'` `(` `)` from a template and trim it.
pub fn clean_value(value: &str) -> String {
    value.replace(NOISE, "").trim().to_string()
}

/// Expand pass, one sweep in name order.
///
/// Only formulas whose value mentions a namespace prefix take part, and only
/// the first bracketed token of each value is used as the substitution key.
/// A key that is not a known formula, or is the formula itself, leaves the
/// value as it is.
pub fn expand_references(table: &mut FormulaTable) {
    let names = table.names().to_vec();
    for name in &names {
        let Some(current) = table.get(name) else {
            continue;
        };
        if !mentions_namespace(current) {
            continue;
        }
        let Some(key) = first_token(current) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        if key == name {
            warn!(formula = %name, "formula refers to itself; left unexpanded");
            continue;
        }
        let Some(replacement) = table.get(key) else {
            debug!(formula = %name, reference = key, "reference is not a known formula");
            continue;
        };
        let expanded = current.replace(&format!("{{{key}}}"), replacement);
        debug!(formula = %name, reference = key, value = %expanded, "expanded formula");
        table.set(name, expanded);
    }
}

/// True when `value` contains any of the cross-reference markers.
pub fn mentions_namespace(value: &str) -> bool {
    [PIPELINE_PREFIX, PROJECT_PREFIX, ASSET_PREFIX]
        .iter()
        .any(|marker| value.contains(marker))
}

/// The first `{token}` in `text`, without braces.
pub fn first_token(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let rest = &text[open + 1..];
    let close = rest.find('}')?;
    Some(&rest[..close])
}

/// Every `{token}` in `text`, in order of appearance.
pub fn extract_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        tokens.push(&after[..close]);
        rest = &after[close + 1..];
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- split / clean -----------------------------------------------------

    #[test]
    fn split_last_definition_wins() {
        let table = split(&["pipe_base_dir = ({drive},)", "pipe_base_dir = ('/mnt',)"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("pipe_base_dir"), Some("('/mnt',)"));
    }

    #[test]
    fn split_skips_lines_without_separator() {
        let table = split(&["pipe_base_dir=({drive},)", "pipe_lib_dir = ({pipe_base_dir}, 'library')"]);
        assert_eq!(table.names(), &["pipe_lib_dir".to_string()]);
    }

    #[test]
    fn clean_strips_tuple_noise() {
        assert_eq!(
            clean_value(" ({pipe_base_dir}, 'projects', {project}) "),
            "{pipe_base_dir} projects {project}"
        );
        assert_eq!(clean_value("({drive},)"), "{drive}");
    }

    // -- tokens ------------------------------------------------------------

    #[test]
    fn first_token_is_leftmost() {
        assert_eq!(first_token("{pr_as_dir} {asset_type}"), Some("pr_as_dir"));
        assert_eq!(first_token("no tokens"), None);
        assert_eq!(first_token("{unclosed"), None);
    }

    #[test]
    fn extract_all_tokens() {
        assert_eq!(
            extract_tokens("{drive} projects {project} {}"),
            vec!["drive", "project", ""]
        );
    }

    // -- expand ------------------------------------------------------------

    #[test]
    fn expands_chain_in_definition_order() {
        let table = expand(&[
            "pipe_base_dir = ({drive},)",
            "pr_base_dir = ({pipe_base_dir}, 'projects', {project})",
            "pr_as_dir = ({pr_base_dir}, 'assets')",
        ]);
        assert_eq!(table.get("pr_base_dir"), Some("{drive} projects {project}"));
        assert_eq!(table.get("pr_as_dir"), Some("{drive} projects {project} assets"));
    }

    #[test]
    fn unknown_reference_leaves_value_unchanged() {
        let table = expand(&["as_base_dir = ({pr_as_type_dir}, {asset})"]);
        assert_eq!(table.get("as_base_dir"), Some("{pr_as_type_dir} {asset}"));
    }

    #[test]
    fn self_reference_is_not_expanded() {
        let table = expand(&["pipe_loop = ({pipe_loop}, 'x')"]);
        assert_eq!(table.get("pipe_loop"), Some("{pipe_loop} x"));
    }

    #[test]
    fn only_first_token_is_expanded() {
        let table = expand(&[
            "pipe_base_dir = ({drive},)",
            "pipe_lib_dir = ({pipe_base_dir}, 'library')",
            "pipe_mix_dir = ({pipe_base_dir}, {pipe_lib_dir})",
        ]);
        assert_eq!(table.get("pipe_mix_dir"), Some("{drive} {pipe_lib_dir}"));
    }

    #[test]
    fn every_occurrence_of_the_key_is_replaced() {
        let table = expand(&[
            "pipe_root = ('srv',)",
            "pipe_twice = ({pipe_root}, 'x', {pipe_root})",
        ]);
        assert_eq!(table.get("pipe_twice"), Some("srv x srv"));
    }

    #[test]
    fn values_without_namespace_marker_are_not_expanded() {
        let table = expand(&["root = ('srv',)", "other = ({root}, 'x')"]);
        assert_eq!(table.get("other"), Some("{root} x"));
    }

    #[test]
    fn forward_reference_uses_unexpanded_value() {
        let table = expand(&[
            "pr_as_dir = ({pr_base_dir}, 'assets')",
            "pr_base_dir = ({pipe_base_dir}, 'projects', {project})",
            "pipe_base_dir = ({drive},)",
        ]);
        // One sweep: pr_as_dir picked up pr_base_dir before it was expanded.
        assert_eq!(table.get("pr_as_dir"), Some("{pipe_base_dir} projects {project} assets"));
        assert_eq!(table.get("pr_base_dir"), Some("{drive} projects {project}"));
    }

    #[test]
    fn rendered_table() {
        let table = expand(&[
            "disk_type = ('work',)",
            "pipe_base_dir = ({drive},)",
            "pipe_mtlx_dir = ({pipe_base_dir}, 'library', 'materialx')",
        ]);
        let rendered: Vec<String> = table.iter().map(|(n, v)| format!("{n} = {v}")).collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        disk_type = work
        pipe_base_dir = {drive}
        pipe_mtlx_dir = {drive} library materialx
        ");
    }
}
