//! ST-001/ST-002: Project configuration — types, YAML parsing, validation.
//!
//! Grouping conventions (movement/part/accompaniment patterns, output
//! extensions, engine invocation, validation scripts) are configuration,
//! never resolver logic. A missing `stretto.yaml` falls back to defaults
//! describing the conventional layout.

use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration — the project's naming conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Schema version (must be "1.0")
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable project name
    #[serde(default = "default_name")]
    pub name: String,

    /// Primary top-level source file, rendered by the `all` target
    #[serde(default = "default_main")]
    pub main: String,

    /// External rendering engine invocation
    #[serde(default)]
    pub engine: EngineConfig,

    /// Metatarget groups (order-preserving)
    #[serde(default = "default_groups")]
    pub groups: IndexMap<String, GroupConfig>,

    /// Validation script hooks
    #[serde(default)]
    pub check: CheckConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: default_name(),
            main: default_main(),
            engine: EngineConfig::default(),
            groups: default_groups(),
            check: CheckConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_name() -> String {
    "score".to_string()
}

fn default_main() -> String {
    "score.ly".to_string()
}

/// How the rendering engine is invoked. Emitted as data only; the
/// generator never runs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine executable
    pub command: String,

    /// Default flags (overridable in the emitted Makefile)
    #[serde(default)]
    pub flags: Vec<String>,

    /// Name of the make variable carrying an optional paper-size override
    #[serde(default = "default_paper_var")]
    pub paper_var: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "lilypond".to_string(),
            flags: vec!["-dno-point-and-click".to_string()],
            paper_var: default_paper_var(),
        }
    }
}

fn default_paper_var() -> String {
    "PAPER".to_string()
}

/// A filename-convention group: sources matched by a root-relative glob,
/// each mapped to an output artifact of one extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Root-relative glob selecting member sources
    pub pattern: String,

    /// Output extension for rendered members (no leading dot)
    pub output: String,
}

fn default_groups() -> IndexMap<String, GroupConfig> {
    IndexMap::from([
        (
            "movements".to_string(),
            GroupConfig {
                pattern: "movements/*.ly".to_string(),
                output: "pdf".to_string(),
            },
        ),
        (
            "parts".to_string(),
            GroupConfig {
                pattern: "parts/*-part*.ly".to_string(),
                output: "pdf".to_string(),
            },
        ),
        (
            "accompaniments".to_string(),
            GroupConfig {
                pattern: "accompaniments/*.ly".to_string(),
                output: "midi".to_string(),
            },
        ),
    ])
}

/// Validation hooks — opaque commands wired into `check`/`test` targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Quick validation command
    #[serde(default = "default_quick")]
    pub quick: String,

    /// Full validation command
    #[serde(default = "default_full")]
    pub full: String,

    /// Paper size used as the second configuration in the consistency check
    #[serde(default = "default_alt_paper")]
    pub alt_paper: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            quick: default_quick(),
            full: default_full(),
            alt_paper: default_alt_paper(),
        }
    }
}

fn default_quick() -> String {
    "scripts/quick-check.sh".to_string()
}

fn default_full() -> String {
    "scripts/full-check.sh".to_string()
}

fn default_alt_paper() -> String {
    "a4".to_string()
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a stretto.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<ProjectConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Parse a stretto.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<ProjectConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Load the project config, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<ProjectConfig, String> {
    if path.exists() {
        parse_config_file(path)
    } else {
        Ok(ProjectConfig::default())
    }
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &ProjectConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.name.is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    if !config.main.ends_with(".ly") {
        errors.push(ValidationError {
            message: format!("main must be a .ly file, got \"{}\"", config.main),
        });
    }

    if config.engine.command.is_empty() {
        errors.push(ValidationError {
            message: "engine command must not be empty".to_string(),
        });
    }

    for (name, group) in &config.groups {
        if group.pattern.is_empty() {
            errors.push(ValidationError {
                message: format!("group '{}' has an empty pattern", name),
            });
        } else if Pattern::new(&group.pattern).is_err() {
            errors.push(ValidationError {
                message: format!("group '{}' has invalid pattern \"{}\"", name, group.pattern),
            });
        }
        if group.output.is_empty() || group.output.starts_with('.') {
            errors.push(ValidationError {
                message: format!(
                    "group '{}' output must be a bare extension, got \"{}\"",
                    name, group.output
                ),
            });
        }
    }

    if config.check.quick.is_empty() || config.check.full.is_empty() {
        errors.push(ValidationError {
            message: "check commands must not be empty".to_string(),
        });
    }

    errors
}
