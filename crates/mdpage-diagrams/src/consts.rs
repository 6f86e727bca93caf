//! Internal constants for diagram processing.

/// Fence opener preceding the diagram language tag.
pub const FENCE: &str = "```";

/// Number of hex characters kept from the content digest.
pub const ID_LEN: usize = 8;

/// Filename prefix for cached diagram files.
pub const FILE_PREFIX: &str = "mermaid_";

/// Extension of the transient diagram source file.
pub const SOURCE_EXT: &str = "mmd";

/// Extension of the persistent rendered image.
pub const SVG_EXT: &str = "svg";
