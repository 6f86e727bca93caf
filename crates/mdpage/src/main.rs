//! mdpage CLI - Markdown to self-contained HTML.
//!
//! Renders one Markdown document to a styled HTML page with Mermaid diagrams
//! and local SVG images inlined, plus an index page linking to it.

mod build;
mod error;
mod output;

use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use build::BuildArgs;
use output::Output;

/// mdpage - Markdown to self-contained HTML.
#[derive(Parser, Debug)]
#[command(name = "mdpage", version, about)]
struct Cli {
    #[command(flatten)]
    build: BuildArgs,
}

/// Process exit status for a command-line parse failure.
fn parse_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_exit_code(err.kind()));
        }
    };
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.build.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.build.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
