//! Stretto CLI — build-graph generation for LilyPond score projects.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "stretto",
    version,
    about = "Makefile generator for multi-movement LilyPond scores"
)]
struct Cli {
    #[command(subcommand)]
    command: stretto::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = stretto::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
