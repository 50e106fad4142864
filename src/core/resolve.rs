//! ST-005: Dependency resolution — raw includes to local record paths.
//!
//! Pipeline per source file: extract raw references, prefix with the
//! source's containing directory, normalize, keep only references that
//! resolve to regular files inside the tree (everything else is a library
//! include supplied by the engine's own search path), map to record names,
//! then sort and deduplicate. Deterministic for a given filesystem state.

use super::{paths, scan};
use std::path::Path;

/// Containing directory of a root-relative source path ("" at the root).
fn source_dir(source: &str) -> &str {
    match source.rfind('/') {
        Some(i) => &source[..i],
        None => "",
    }
}

/// Direct local dependencies of `source`, as sorted root-relative source
/// paths. References that escape the tree or do not exist locally are
/// silently excluded.
pub fn source_dependencies(root: &Path, source: &str) -> Result<Vec<String>, String> {
    let references = scan::scan_file(&root.join(source))?;
    let dir = source_dir(source);

    let mut deps = Vec::new();
    for reference in references {
        let candidate = paths::resolve(dir, &reference);
        // A surviving ../ would point outside the tree; never an edge.
        if candidate.starts_with("../") || candidate.starts_with('/') {
            continue;
        }
        if root.join(&candidate).is_file() {
            deps.push(candidate);
        }
    }

    deps.sort();
    deps.dedup();
    Ok(deps)
}

/// Sorted, deduplicated dependency-record paths for `source`.
pub fn resolve_dependencies(root: &Path, source: &str) -> Result<Vec<String>, String> {
    let mut records: Vec<String> = source_dependencies(root, source)?
        .iter()
        .map(|dep| paths::record_path(dep))
        .collect();
    records.sort();
    records.dedup();
    Ok(records)
}
