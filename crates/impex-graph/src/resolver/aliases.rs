//! Path alias rewriting ("@/components" -> "./src/components").

use indexmap::IndexMap;

/// Rewrite a specifier through the alias table, if any alias matches.
///
/// An alias matches the whole specifier or a prefix followed by `/`, so `@app`
/// never captures `@apple/core`. Insertion order is match order; the first
/// matching alias wins.
pub fn resolve_path_alias(specifier: &str, aliases: &IndexMap<String, String>) -> Option<String> {
    for (alias, target) in aliases {
        let rest = if specifier == alias {
            ""
        } else if let Some(rest) = specifier
            .strip_prefix(alias.as_str())
            .and_then(|r| r.strip_prefix('/'))
        {
            rest
        } else {
            continue;
        };

        let rewritten = if rest.is_empty() {
            target.clone()
        } else {
            format!("{}/{rest}", target.trim_end_matches('/'))
        };

        return Some(rewritten);
    }

    None
}
