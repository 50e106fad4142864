//! ST-004: Include extraction — regex scan for `\include "path"`.
//!
//! The include grammar is regular (one marker token plus one quoted
//! argument), so a single compiled regex over the whole file is enough.
//! Malformed directives (unquoted arguments) simply never match and are
//! silently skipped.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // After the keyword only whitespace or the opening quote may follow,
    // which keeps `\includeSettings` and friends from matching; quoted
    // arguments never contain quotes or newlines.
    RE.get_or_init(|| Regex::new(r#"\\include\s*"([^"\n]+)""#).unwrap())
}

/// Extract every `\include` argument from source text, in file order.
pub fn extract_includes(content: &str) -> Vec<String> {
    include_re()
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect()
}

/// Read a source file and extract its includes. Unreadable files are
/// fatal — generation must not proceed on a partial graph.
pub fn scan_file(path: &Path) -> Result<Vec<String>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Ok(extract_includes(&content))
}
