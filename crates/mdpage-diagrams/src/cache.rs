//! Content-addressed diagram cache.
//!
//! Provides [`DiagramId`] for computing content-based identifiers and
//! [`DiagramStore`], the on-disk layout keyed by those identifiers:
//!
//! ```text
//! {output_dir}/
//! +-- mermaid_{id}.mmd   # transient source, removed after rendering
//! +-- mermaid_{id}.svg   # rendered image, kept across runs
//! ```
//!
//! An entry is valid for as long as its `.svg` file exists. There is no
//! expiry: identical source always maps to the same file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::consts::{FILE_PREFIX, ID_LEN, SOURCE_EXT, SVG_EXT};
use crate::error::DiagramError;

/// Short content hash identifying a diagram source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramId(String);

impl DiagramId {
    /// Compute the identifier for a (trimmed) diagram source.
    ///
    /// # Hash Format
    ///
    /// First 8 hex characters of SHA-256 of the source bytes.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let digest = Sha256::digest(source.as_bytes());
        let mut hex = hex::encode(digest);
        hex.truncate(ID_LEN);
        Self(hex)
    }

    /// Identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Diagram files rooted at an output directory.
#[derive(Debug, Clone)]
pub struct DiagramStore {
    dir: PathBuf,
}

impl DiagramStore {
    /// Create a store rooted at `dir`. Nothing is touched on disk.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the root directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), DiagramError> {
        fs::create_dir_all(&self.dir).map_err(|e| DiagramError::io(&self.dir, e))
    }

    /// Path of the transient source file for `id`.
    #[must_use]
    pub fn source_path(&self, id: &DiagramId) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}.{SOURCE_EXT}"))
    }

    /// Path of the rendered image for `id`.
    #[must_use]
    pub fn svg_path(&self, id: &DiagramId) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}.{SVG_EXT}"))
    }

    /// Whether a rendered image for `id` is already present.
    #[must_use]
    pub fn contains(&self, id: &DiagramId) -> bool {
        self.svg_path(id).is_file()
    }

    /// Write the diagram source for `id`, returning its path.
    pub fn write_source(&self, id: &DiagramId, source: &str) -> Result<PathBuf, DiagramError> {
        let path = self.source_path(id);
        fs::write(&path, source).map_err(|e| DiagramError::io(&path, e))?;
        Ok(path)
    }

    /// Remove a transient source file. Failures are logged, not raised.
    pub fn remove_source(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("failed to remove {}: {e}", path.display());
        }
    }

    /// Drop a partially written image so it is not mistaken for a cache hit.
    pub fn discard_svg(&self, id: &DiagramId) {
        let path = self.svg_path(id);
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!("discarded {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove {}: {e}", path.display()),
        }
    }

    /// Read the rendered image for `id`.
    pub fn read_svg(&self, id: &DiagramId) -> Result<String, DiagramError> {
        let path = self.svg_path(id);
        fs::read_to_string(&path).map_err(|e| DiagramError::io(&path, e))
    }
}
