//! ST-006: Build-rule model — structured rules serialized at the end.
//!
//! Rules are plain data until the whole document is assembled; emission
//! logic stays testable independent of make's textual formatting.

use super::{paths, resolve};
use std::path::Path;

/// One make rule: target, prerequisites, recipe lines, attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: String,
    pub prerequisites: Vec<String>,
    pub recipe: Vec<String>,
    /// Declared `.PHONY` — an aggregate name, not a file.
    pub phony: bool,
    /// Declared `.SECONDARY` — never deleted as a disposable intermediate.
    pub secondary: bool,
}

impl Rule {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            prerequisites: Vec::new(),
            recipe: Vec::new(),
            phony: false,
            secondary: false,
        }
    }

    /// Render to make syntax, attribute declarations first.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if self.phony {
            lines.push(format!(".PHONY: {}", self.target));
        }
        if self.secondary {
            lines.push(format!(".SECONDARY: {}", self.target));
        }
        if self.prerequisites.is_empty() {
            lines.push(format!("{}:", self.target));
        } else {
            lines.push(format!("{}: {}", self.target, self.prerequisites.join(" ")));
        }
        for step in &self.recipe {
            lines.push(format!("\t{}", step));
        }
        lines.join("\n")
    }
}

/// Render a rule list as one document section.
pub fn render_all(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.render());
        out.push_str("\n\n");
    }
    out
}

/// Per-file rule: the source's dependency record, kept across partial
/// builds, depending on the source itself plus the records of everything
/// it includes. `touch` freshens the record so timestamp changes chain
/// through record-to-record edges without any transitive closure here.
pub fn record_rule(root: &Path, source: &str) -> Result<Rule, String> {
    let mut prerequisites = vec![source.to_string()];
    prerequisites.extend(resolve::resolve_dependencies(root, source)?);

    Ok(Rule {
        target: paths::record_path(source),
        prerequisites,
        recipe: vec!["touch $@".to_string()],
        phony: false,
        secondary: true,
    })
}
