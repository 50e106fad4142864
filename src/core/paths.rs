//! ST-003: Path rewriting — parent-segment collapse and record naming.
//!
//! Both functions are pure textual rewrites. Normalization collapses the
//! spurious `component/../` segments that base-directory joins introduce;
//! it is not filesystem canonicalization and never resolves symlinks or
//! leading `../` escapes.

/// Collapse every `X/../` segment where X is a real component (not `..`,
/// not `.`), repeating until no such pattern remains. A leading `../` with
/// no preceding component is preserved.
pub fn normalize(path: &str) -> String {
    let mut result = path.to_string();
    while let Some((start, end)) = find_collapsible(&result) {
        result.replace_range(start..end, "");
    }
    result
}

/// Byte range of the first collapsible `X/../` segment, if any.
fn find_collapsible(s: &str) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut search = 0;
    while let Some(found) = s[search..].find("../") {
        let pos = search + found;
        // `../` must directly follow a `X/` component.
        if pos == 0 || bytes[pos - 1] != b'/' {
            search = pos + 3;
            continue;
        }
        let comp_start = s[..pos - 1].rfind('/').map(|i| i + 1).unwrap_or(0);
        let comp = &s[comp_start..pos - 1];
        if comp.is_empty() || comp == ".." || comp == "." {
            search = pos + 3;
            continue;
        }
        return Some((comp_start, pos + 3));
    }
    None
}

/// Join an include reference onto its base directory and normalize.
/// An empty base (source at the tree root) leaves the reference bare.
pub fn resolve(base_dir: &str, reference: &str) -> String {
    if base_dir.is_empty() {
        normalize(reference)
    } else {
        normalize(&format!("{}/{}", base_dir, reference))
    }
}

/// Dependency-record path for a source file: `dir/name.ext` becomes
/// `dir/.name.ext.record`. Single source of truth for the sidecar
/// transform; injective, since the original filename survives verbatim.
pub fn record_path(path: &str) -> String {
    match path.rfind('/') {
        Some(i) => format!("{}/.{}.record", &path[..i], &path[i + 1..]),
        None => format!(".{}.record", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_st003_normalize_single_segment() {
        assert_eq!(normalize("parts/foo/../shared/x.ily"), "parts/shared/x.ily");
    }

    #[test]
    fn test_st003_normalize_multiple_segments() {
        assert_eq!(normalize("a/b/../c/../d.ly"), "a/d.ly");
    }

    #[test]
    fn test_st003_normalize_nested_fixpoint() {
        // Collapsing b/../ exposes a/../, which must also collapse.
        assert_eq!(normalize("a/b/../../c.ly"), "c.ly");
    }

    #[test]
    fn test_st003_normalize_preserves_leading_parent() {
        assert_eq!(normalize("../lib/x.ly"), "../lib/x.ly");
    }

    #[test]
    fn test_st003_normalize_parent_after_leading_parent() {
        // The leading ../ is not a real component and never absorbs one.
        assert_eq!(normalize("a/../../b.ly"), "../b.ly");
    }

    #[test]
    fn test_st003_normalize_no_op() {
        assert_eq!(normalize("movements/allegro.ly"), "movements/allegro.ly");
        assert_eq!(normalize("x.ly"), "x.ly");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_st003_resolve_with_base() {
        assert_eq!(resolve("parts", "shared/dynamics.ily"), "parts/shared/dynamics.ily");
        assert_eq!(resolve("parts", "../shared/dynamics.ily"), "shared/dynamics.ily");
    }

    #[test]
    fn test_st003_resolve_empty_base() {
        assert_eq!(resolve("", "global.ily"), "global.ily");
        assert_eq!(resolve("", "../outside.ily"), "../outside.ily");
    }

    #[test]
    fn test_st003_record_path_nested() {
        assert_eq!(record_path("shared/dynamics.ily"), "shared/.dynamics.ily.record");
        assert_eq!(record_path("root/lib/x.ly"), "root/lib/.x.ly.record");
    }

    #[test]
    fn test_st003_record_path_top_level() {
        assert_eq!(record_path("score.ly"), ".score.ly.record");
    }

    proptest! {
        #[test]
        fn test_st003_normalize_idempotent(p in "[a-c./]{0,16}") {
            let once = normalize(&p);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_st003_normalize_leaves_no_collapsible(p in "[a-c./]{0,16}") {
            prop_assert!(find_collapsible(&normalize(&p)).is_none());
        }

        #[test]
        fn test_st003_record_path_injective(
            a in "([a-d]{1,4}/)?[a-d]{1,4}\\.(ly|ily)",
            b in "([a-d]{1,4}/)?[a-d]{1,4}\\.(ly|ily)",
        ) {
            if a != b {
                prop_assert_ne!(record_path(&a), record_path(&b));
            }
        }
    }
}
