//! toot CLI - status content tools.
//!
//! Provides commands for:
//! - `render`: Sanitize and render status HTML for display
//! - `editor`: Convert status HTML to composer markup
//! - `text`: Extract plain text from status HTML

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{EditorArgs, RenderArgs, TextArgs};
use output::Output;

/// toot - status content tools.
#[derive(Parser)]
#[command(name = "toot", version, about)]
struct Cli {
    /// Enable verbose output (pipeline logs on stderr).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render status HTML for display.
    Render(RenderArgs),
    /// Convert status HTML to composer markup.
    Editor(EditorArgs),
    /// Extract plain text from status HTML.
    Text(TextArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Editor(args) => args.execute(&output),
        Commands::Text(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
