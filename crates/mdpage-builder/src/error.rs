//! Build pipeline errors.

use std::path::PathBuf;

use mdpage_diagrams::DiagramError;

/// Error that aborts a page build.
///
/// No output page is written once any of these has been raised.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The input document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Input document path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Diagram extraction, rendering or inlining failed.
    #[error(transparent)]
    Diagram(#[from] DiagramError),

    /// An output page could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Output page path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
