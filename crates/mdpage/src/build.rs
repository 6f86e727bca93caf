//! Document build command.

use std::path::PathBuf;

use clap::Args;
use mdpage_builder::{PageBuilder, PageBuilderConfig};
use mdpage_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for building a document.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// Markdown document to render.
    pub input: PathBuf,

    /// Path to configuration file (default: auto-discover mdpage.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Diagram cache directory (overrides config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Mermaid CLI executable (overrides config).
    #[arg(long, env = "MDPAGE_MERMAID_CLI")]
    pub mermaid_cli: Option<PathBuf>,

    /// Enable verbose output (cache hits, renderer invocations).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any pipeline stage fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            command: self.mermaid_cli,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!("using configuration {}", path.display());
        }

        let builder = PageBuilder::new(PageBuilderConfig::from(&config));
        let result = builder.build(&self.input, output)?;
        tracing::info!(
            diagrams = result.diagrams,
            rendered = result.rendered,
            inlined = result.inlined,
            "build finished"
        );
        Ok(())
    }
}
