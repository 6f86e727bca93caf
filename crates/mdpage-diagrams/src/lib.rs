//! Mermaid diagram handling for mdpage.
//!
//! This crate turns diagram blocks and local SVG references in a Markdown
//! document into inline SVG markup:
//! - `DiagramScanner` finds fenced diagram blocks in a single forward pass
//! - `DiagramStore` caches rendered images by content hash across runs
//! - `MermaidCli` drives the external `mmdc` renderer
//! - `DiagramProcessor` ties them together, rendering each distinct diagram once
//! - `SvgInliner` replaces `![alt](file.svg)` references with file content
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`scanner`]: block discovery state machine (`Segment`, `DiagramBlock`)
//! - [`cache`]: content identifiers and on-disk layout
//! - [`mermaid`]: renderer trait and the Mermaid CLI implementation
//! - [`processor`]: substitution of blocks with rendered SVG
//! - [`inline`]: local SVG image inlining
//!
//! # Example
//!
//! ```ignore
//! use mdpage_diagrams::{DiagramProcessor, MermaidCli, SvgInliner};
//!
//! let renderer = MermaidCli::new("node_modules/.bin/mmdc", "mermaid.json");
//! let processor = DiagramProcessor::new("tmp", Box::new(renderer));
//! let processed = processor.process(&markdown)?;
//! let inlined = SvgInliner::for_document(path).inline(&processed.text)?;
//! ```

mod cache;
mod consts;
mod error;
mod inline;
mod mermaid;
mod processor;
mod scanner;

pub use cache::{DiagramId, DiagramStore};
pub use error::DiagramError;
pub use inline::{InlineResult, SvgInliner};
pub use mermaid::{DiagramRenderer, MermaidCli};
pub use processor::{DiagramProcessor, ProcessedDocument};
pub use scanner::{DiagramBlock, DiagramScanner, Segment};
