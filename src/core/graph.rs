//! ST-007: Graph emission — source discovery, per-file rules, cycle check.
//!
//! Fragment (`.ily`) files are enumerated alongside renderable (`.ly`)
//! sources so their nested includes stay tracked. Discovery order is
//! sorted, which makes the whole emitted document stable across runs.

use super::{resolve, rules};
use glob::{MatchOptions, Pattern};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// Extensions the tree is scanned for: renderable score files and
/// include-only fragments.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["ly", "ily"];

/// Enumerate every source file under `root`, as sorted root-relative paths.
pub fn discover_sources(root: &Path) -> Result<Vec<String>, String> {
    let options = MatchOptions {
        // Dependency records and other dotfiles are not sources.
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    // The root is literal path text; metacharacters in it ([, ?, *)
    // must not leak into the glob.
    let root_literal = Pattern::escape(&root.display().to_string());

    let mut sources = Vec::new();
    for ext in SOURCE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", root_literal, ext);
        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| format!("bad glob pattern {}: {}", pattern, e))?;
        for entry in entries {
            let path = entry.map_err(|e| format!("cannot read {}: {}", e.path().display(), e))?;
            if !path.is_file() {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .map_err(|e| format!("path {} outside root: {}", path.display(), e))?;
            sources.push(rel.to_string_lossy().into_owned());
        }
    }

    sources.sort();
    sources.dedup();
    Ok(sources)
}

/// Emit the per-file dependency-record rule for every source.
pub fn graph_rules(root: &Path, sources: &[String]) -> Result<Vec<rules::Rule>, String> {
    sources
        .iter()
        .map(|source| rules::record_rule(root, source))
        .collect()
}

/// Reject cyclic include graphs before emission. Kahn's algorithm with
/// alphabetical tie-breaking; leftover nodes are the cycle members.
pub fn check_acyclic(root: &Path, sources: &[String]) -> Result<(), String> {
    let tracked: HashSet<&str> = sources.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> =
        sources.iter().map(|s| (s.as_str(), 0)).collect();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for source in sources {
        for dep in resolve::source_dependencies(root, source)? {
            if let Some(&dep_key) = tracked.get(dep.as_str()) {
                adjacency.entry(dep_key).or_default().push(source.as_str());
                *in_degree.get_mut(source.as_str()).unwrap() += 1;
            }
        }
    }

    let mut zero_degree: Vec<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&s, _)| s)
        .collect();
    zero_degree.sort_unstable();
    let mut queue: VecDeque<&str> = zero_degree.into();

    let mut visited = 0usize;
    while let Some(current) = queue.pop_front() {
        visited += 1;
        let mut next_ready = Vec::new();
        if let Some(neighbors) = adjacency.get(current) {
            for &neighbor in neighbors {
                let degree = in_degree.get_mut(neighbor).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    next_ready.push(neighbor);
                }
            }
        }
        next_ready.sort_unstable();
        for s in next_ready {
            queue.push_back(s);
        }
    }

    if visited != sources.len() {
        let members: Vec<&str> = sources
            .iter()
            .map(String::as_str)
            .filter(|s| in_degree[s] > 0)
            .collect();
        return Err(format!(
            "include cycle detected involving: {}",
            members.join(", ")
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_st007_discover_sorted_both_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "score.ly", "");
        write(dir.path(), "shared/global.ily", "");
        write(dir.path(), "movements/allegro.ly", "");

        let sources = discover_sources(dir.path()).unwrap();
        assert_eq!(
            sources,
            vec!["movements/allegro.ly", "score.ly", "shared/global.ily"]
        );
    }

    #[test]
    fn test_st007_discover_skips_records_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "score.ly", "");
        write(dir.path(), ".score.ly.record", "");
        write(dir.path(), ".hidden.ly", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), "score.pdf", "");

        let sources = discover_sources(dir.path()).unwrap();
        assert_eq!(sources, vec!["score.ly"]);
    }

    #[test]
    fn test_st007_discover_root_with_glob_metacharacters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scores[2020]");
        write(&root, "score.ly", "");
        write(&root, "movements/01.ly", "");

        let sources = discover_sources(&root).unwrap();
        assert_eq!(sources, vec!["movements/01.ly", "score.ly"]);
    }

    #[test]
    fn test_st007_discover_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sources(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_st007_graph_rules_cover_fragments() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "score.ly", "\\include \"a.ily\"\n");
        write(dir.path(), "a.ily", "\\include \"b.ily\"\n");
        write(dir.path(), "b.ily", "");

        let sources = discover_sources(dir.path()).unwrap();
        let rules = graph_rules(dir.path(), &sources).unwrap();
        assert_eq!(rules.len(), 3);

        // Fragment-only files get their own rules, so nested includes chain.
        let a = rules.iter().find(|r| r.target == ".a.ily.record").unwrap();
        assert!(a.prerequisites.contains(&".b.ily.record".to_string()));
        let score = rules.iter().find(|r| r.target == ".score.ly.record").unwrap();
        assert!(score.prerequisites.contains(&".a.ily.record".to_string()));
        assert!(!score.prerequisites.contains(&".b.ily.record".to_string()));
    }

    #[test]
    fn test_st007_acyclic_ok() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "score.ly", "\\include \"a.ily\"\n\\include \"b.ily\"\n");
        write(dir.path(), "a.ily", "\\include \"b.ily\"\n");
        write(dir.path(), "b.ily", "");

        let sources = discover_sources(dir.path()).unwrap();
        check_acyclic(dir.path(), &sources).unwrap();
    }

    #[test]
    fn test_st007_cycle_detected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.ily", "\\include \"b.ily\"\n");
        write(dir.path(), "b.ily", "\\include \"a.ily\"\n");
        write(dir.path(), "free.ly", "");

        let sources = discover_sources(dir.path()).unwrap();
        let result = check_acyclic(dir.path(), &sources);
        assert!(result.is_err());
        let message = result.unwrap_err();
        assert!(message.contains("cycle"));
        assert!(message.contains("a.ily"));
        assert!(message.contains("b.ily"));
        assert!(!message.contains("free.ly"));
    }

    #[test]
    fn test_st007_self_include_is_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "loop.ily", "\\include \"loop.ily\"\n");

        let sources = discover_sources(dir.path()).unwrap();
        assert!(check_acyclic(dir.path(), &sources).is_err());
    }

    #[test]
    fn test_st007_diamond_is_acyclic() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "top.ly", "\\include \"left.ily\"\n\\include \"right.ily\"\n");
        write(dir.path(), "left.ily", "\\include \"base.ily\"\n");
        write(dir.path(), "right.ily", "\\include \"base.ily\"\n");
        write(dir.path(), "base.ily", "");

        let sources = discover_sources(dir.path()).unwrap();
        check_acyclic(dir.path(), &sources).unwrap();
    }
}
