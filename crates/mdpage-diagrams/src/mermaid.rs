//! External diagram renderer boundary.
//!
//! [`DiagramRenderer`] abstracts the process that turns a diagram source file
//! into an SVG file. [`MermaidCli`] is the production implementation, driving
//! the Mermaid command-line tool (`mmdc`) synchronously.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DiagramError;

/// Renders a diagram source file to an SVG file.
pub trait DiagramRenderer {
    /// Verify the renderer can run at all.
    ///
    /// Called once, before the first uncached diagram is rendered, so a
    /// missing tool fails the build before any diagram file is written.
    fn check(&self) -> Result<(), DiagramError>;

    /// Render `input` to `output`, blocking until done.
    ///
    /// Must leave a file at `output` on success.
    fn render(&self, input: &Path, output: &Path) -> Result<(), DiagramError>;
}

/// Mermaid CLI renderer.
///
/// Invokes `{command} -i {input} -o {output} -c {config_file}`.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    command: PathBuf,
    config_file: PathBuf,
}

impl MermaidCli {
    /// Create a renderer for the given executable and style config file.
    ///
    /// A bare command name (no path separator) is looked up on `PATH`.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            config_file: config_file.into(),
        }
    }

    /// Locate the executable, searching `PATH` for bare names.
    fn locate(&self) -> Option<PathBuf> {
        let is_bare = self
            .command
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty());
        if !is_bare {
            return self.command.is_file().then(|| self.command.clone());
        }
        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .map(|dir| dir.join(&self.command))
            .find(|candidate| candidate.is_file())
    }
}

impl DiagramRenderer for MermaidCli {
    fn check(&self) -> Result<(), DiagramError> {
        let Some(executable) = self.locate() else {
            return Err(DiagramError::RendererUnavailable(format!(
                "'{}' not found; install @mermaid-js/mermaid-cli (npm install) or set diagrams.command",
                self.command.display()
            )));
        };
        if !self.config_file.is_file() {
            return Err(DiagramError::RendererUnavailable(format!(
                "style config '{}' not found",
                self.config_file.display()
            )));
        }
        tracing::debug!("using diagram renderer {}", executable.display());
        Ok(())
    }

    fn render(&self, input: &Path, output: &Path) -> Result<(), DiagramError> {
        let failed = |message: String| DiagramError::RenderFailed {
            input: input.to_path_buf(),
            message,
        };

        let result = Command::new(&self.command)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-c")
            .arg(&self.config_file)
            .output()
            .map_err(|e| failed(format!("failed to run {}: {e}", self.command.display())))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stderr = stderr.trim();
            return Err(failed(if stderr.is_empty() {
                format!("renderer exited with {}", result.status)
            } else {
                format!("renderer exited with {}: {stderr}", result.status)
            }));
        }

        if !output.is_file() {
            return Err(failed(format!(
                "renderer did not produce {}",
                output.display()
            )));
        }

        Ok(())
    }
}
