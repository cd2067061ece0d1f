//! puml CLI - `PlantUML` render-and-embed tool.
//!
//! Provides commands for:
//! - `render`: Render diagrams and print their embed markup
//! - `url`: Print the `PlantUML` server URL for a diagram
//! - `css`: Print the stylesheet for embedded diagrams

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CssArgs, RenderArgs, UrlArgs};
use output::Output;

/// puml - `PlantUML` render-and-embed tool.
#[derive(Parser)]
#[command(name = "puml", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render diagrams and print their embed markup.
    Render(RenderArgs),
    /// Print the server URL that renders a diagram.
    Url(UrlArgs),
    /// Print the stylesheet for embedded diagrams.
    Css(CssArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Url(args) => args.execute(),
        Commands::Css(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
