//! ST-008: Metatargets, entry points, and Makefile assembly.
//!
//! Entry-point rules join the dependency graph to artifact production:
//! the rendered output depends on the source's record chain, and the
//! recipe is the engine command line emitted as data. The whole document
//! is built in memory and only replaces the previous Makefile on success.

use super::config::{GroupConfig, ProjectConfig};
use super::{graph, paths, rules};
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::Path;

/// Expected output artifact for a source: extension swapped.
pub fn output_name(source: &str, ext: &str) -> String {
    match source.rfind('.') {
        Some(i) => format!("{}.{}", &source[..i], ext),
        None => format!("{}.{}", source, ext),
    }
}

/// Group members among the discovered sources, in discovery (sorted) order.
pub fn group_members(sources: &[String], group: &GroupConfig) -> Result<Vec<String>, String> {
    let pattern = Pattern::new(&group.pattern)
        .map_err(|e| format!("invalid group pattern \"{}\": {}", group.pattern, e))?;
    let options = MatchOptions {
        require_literal_separator: true,
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    Ok(sources
        .iter()
        .filter(|s| pattern.matches_with(s, options))
        .cloned()
        .collect())
}

/// Entry point: output from source via the engine, through the record chain.
pub fn entry_point_rule(source: &str, output: &str) -> rules::Rule {
    let stem = match output.rfind('.') {
        Some(i) => &output[..i],
        None => output,
    };
    rules::Rule {
        target: output.to_string(),
        prerequisites: vec![source.to_string(), paths::record_path(source)],
        recipe: vec![format!("$(LILYPOND) $(LILYPOND_FLAGS) -o {} {}", stem, source)],
        phony: false,
        secondary: false,
    }
}

/// Aggregate target: every member's output, buildable as one unit.
pub fn metatarget_rule(name: &str, output_ext: &str, members: &[String]) -> rules::Rule {
    rules::Rule {
        target: name.to_string(),
        prerequisites: members.iter().map(|m| output_name(m, output_ext)).collect(),
        recipe: Vec::new(),
        phony: true,
        secondary: false,
    }
}

/// Static preamble: engine invocation with overridable flags and the
/// optional paper-size override variable.
fn preamble(config: &ProjectConfig) -> String {
    let engine = &config.engine;
    format!(
        "# Makefile generated by stretto {} for {} — do not edit, re-run `stretto generate`.\n\n\
         LILYPOND ?= {}\n\
         LILYPOND_FLAGS ?= {}\n\n\
         ifdef {}\n\
         LILYPOND_FLAGS += -dpaper-size='\"$({})\"'\n\
         endif\n",
        env!("CARGO_PKG_VERSION"),
        config.name,
        engine.command,
        engine.flags.join(" "),
        engine.paper_var,
        engine.paper_var,
    )
}

fn consistency_rule(config: &ProjectConfig) -> rules::Rule {
    let mut rule = rules::Rule::new("consistency");
    rule.phony = true;
    rule.recipe = vec![
        "$(MAKE) clean".to_string(),
        "$(MAKE) all 2>&1 | tee .consistency-first.log".to_string(),
        "$(MAKE) clean".to_string(),
        format!(
            "$(MAKE) {}={} all 2>&1 | tee .consistency-second.log",
            config.engine.paper_var, config.check.alt_paper
        ),
        "! grep -iE '(warning|error)' .consistency-first.log .consistency-second.log".to_string(),
        "rm -f .consistency-first.log .consistency-second.log".to_string(),
    ];
    rule
}

/// Assemble the complete build description. Any filesystem error aborts
/// with no document produced.
pub fn assemble(root: &Path, config: &ProjectConfig) -> Result<String, String> {
    let sources = graph::discover_sources(root)?;
    graph::check_acyclic(root, &sources)?;

    let has_main = sources.iter().any(|s| s == &config.main);
    let main_output = output_name(&config.main, "pdf");

    let mut out_rules: Vec<rules::Rule> = Vec::new();
    let mut artifacts: Vec<String> = Vec::new();
    let mut entry_targets: HashSet<String> = HashSet::new();

    // Aggregate build-everything target first.
    let mut all_rule = rules::Rule::new("all");
    all_rule.phony = true;
    if has_main {
        all_rule.prerequisites.push(main_output.clone());
    }
    all_rule.prerequisites.extend(config.groups.keys().cloned());
    out_rules.push(all_rule);

    // Entry point for the primary file.
    if has_main {
        out_rules.push(entry_point_rule(&config.main, &main_output));
        entry_targets.insert(main_output.clone());
        artifacts.push(main_output);
    }

    // Metatargets and member entry points, in config order.
    for (name, group) in &config.groups {
        let members = group_members(&sources, group)?;
        out_rules.push(metatarget_rule(name, &group.output, &members));
        for member in &members {
            let output = output_name(member, &group.output);
            if entry_targets.insert(output.clone()) {
                out_rules.push(entry_point_rule(member, &output));
                artifacts.push(output);
            }
        }
    }

    // Validation and consistency targets — opaque external commands.
    let mut check_rule = rules::Rule::new("check");
    check_rule.phony = true;
    check_rule.recipe = vec![config.check.quick.clone()];
    out_rules.push(check_rule);

    let mut test_rule = rules::Rule::new("test");
    test_rule.phony = true;
    test_rule.recipe = vec![config.check.full.clone()];
    out_rules.push(test_rule);

    out_rules.push(consistency_rule(config));

    // Clean: every known artifact plus all dependency records.
    let mut clean_rule = rules::Rule::new("clean");
    clean_rule.phony = true;
    if !artifacts.is_empty() {
        clean_rule.recipe.push(format!("rm -f {}", artifacts.join(" ")));
    }
    clean_rule
        .recipe
        .push("find . -name '.*.record' -delete".to_string());
    out_rules.push(clean_rule);

    // Full dependency subgraph last.
    out_rules.extend(graph::graph_rules(root, &sources)?);

    let mut doc = preamble(config);
    doc.push('\n');
    doc.push_str(&rules::render_all(&out_rules));
    Ok(doc)
}

/// Replace the previous Makefile atomically (temp file + rename), so an
/// interrupted run never leaves a truncated document behind.
pub fn write_makefile(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;
    Ok(())
}
