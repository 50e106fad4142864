//! ST-009: CLI subcommands — init, validate, list, deps, generate.
//!
//! The project root is an explicit parameter threaded through every call;
//! the generator never changes the process working directory.

use crate::core::{config, emit, graph, resolve};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new stretto project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate stretto.yaml without touching the source tree
    Validate {
        /// Path to stretto.yaml
        #[arg(short, long, default_value = "stretto.yaml")]
        config: PathBuf,
    },

    /// List discovered sources and group membership
    List {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Path to stretto.yaml
        #[arg(short, long, default_value = "stretto.yaml")]
        config: PathBuf,
    },

    /// Show the resolved dependency records of one source file
    Deps {
        /// Root-relative source path
        file: String,

        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the Makefile
    Generate {
        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Path to stretto.yaml
        #[arg(short, long, default_value = "stretto.yaml")]
        config: PathBuf,

        /// Output path for the build description
        #[arg(short, long, default_value = "Makefile")]
        output: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::List { root, config } => cmd_list(&root, &config),
        Commands::Deps { file, root, json } => cmd_deps(&root, &file, json),
        Commands::Generate {
            root,
            config,
            output,
        } => cmd_generate(&root, &config, &output),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("stretto.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version: "1.0"
name: my-score
main: score.ly

engine:
  command: lilypond
  flags: ["-dno-point-and-click"]
  paper_var: PAPER

groups:
  movements:
    pattern: "movements/*.ly"
    output: pdf
  parts:
    pattern: "parts/*-part*.ly"
    output: pdf
  accompaniments:
    pattern: "accompaniments/*.ly"
    output: midi

check:
  quick: scripts/quick-check.sh
  full: scripts/full-check.sh
  alt_paper: a4
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized stretto project at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), String> {
    let config = config::parse_config_file(config_path)?;
    let errors = config::validate_config(&config);

    if errors.is_empty() {
        println!(
            "OK: {} (main {}, {} groups)",
            config.name,
            config.main,
            config.groups.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

/// Load the config (defaults if absent) and fail on validation errors.
fn load_and_validate(config_path: &Path) -> Result<config::ProjectConfig, String> {
    let config = config::load_config(config_path)?;
    let errors = config::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

fn cmd_list(root: &Path, config_path: &Path) -> Result<(), String> {
    let config = load_and_validate(config_path)?;
    let sources = graph::discover_sources(root)?;

    println!("Sources: {} ({})", sources.len(), config.name);
    if sources.iter().any(|s| s == &config.main) {
        println!("  main: {}", config.main);
    }
    for (name, group) in &config.groups {
        let members = emit::group_members(&sources, group)?;
        println!("  {} ({} → .{}):", name, members.len(), group.output);
        for member in &members {
            println!("    {}", member);
        }
    }

    let fragments = sources.iter().filter(|s| s.ends_with(".ily")).count();
    println!("  fragments: {}", fragments);
    Ok(())
}

fn cmd_deps(root: &Path, file: &str, json: bool) -> Result<(), String> {
    let records = resolve::resolve_dependencies(root, file)?;

    if json {
        let doc = serde_json::json!({
            "source": file,
            "records": records,
        });
        let rendered = serde_json::to_string_pretty(&doc)
            .map_err(|e| format!("JSON encode error: {}", e))?;
        println!("{}", rendered);
    } else {
        println!("{}: {} record dependencies", file, records.len());
        for record in &records {
            println!("  {}", record);
        }
    }
    Ok(())
}

fn cmd_generate(root: &Path, config_path: &Path, output: &Path) -> Result<(), String> {
    let config = load_and_validate(config_path)?;

    let document = emit::assemble(root, &config)?;
    emit::write_makefile(output, &document)?;

    let rule_count = document.lines().filter(|l| l.starts_with(".SECONDARY:")).count();
    println!(
        "Generated {} ({} dependency records)",
        output.display(),
        rule_count
    );
    Ok(())
}
