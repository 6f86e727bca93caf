//! Diagram processing errors.

use std::path::PathBuf;

/// Error raised while extracting, rendering or inlining diagrams.
///
/// Every variant aborts the build; the only recoverable condition (a missing
/// inlined SVG) is reported as a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// A diagram fence was opened but never closed.
    #[error("Unclosed {language} block starting at line {line}")]
    UnclosedBlock {
        /// Fence tag of the block.
        language: String,
        /// 1-based line of the opening fence.
        line: usize,
    },

    /// The external renderer failed its startup precondition check.
    #[error("Diagram renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// The external renderer could not produce an image.
    #[error("Diagram rendering failed for {}: {message}", input.display())]
    RenderFailed {
        /// Diagram source file handed to the renderer.
        input: PathBuf,
        /// Failure description (exit status and captured stderr).
        message: String,
    },

    /// Reading or writing a diagram file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

impl DiagramError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
