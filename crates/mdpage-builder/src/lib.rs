//! Page build pipeline for mdpage.
//!
//! This crate ties the other mdpage crates together. [`PageBuilder`] reads a
//! Markdown document, replaces diagram blocks and local SVG references with
//! inline SVG, renders the body to HTML and writes two pages from the fixed
//! [`PAGE_SHELL`]: the document page and an index page linking to it.
//!
//! Progress is reported through [`BuildReporter`]; the library itself never
//! prints.

mod builder;
mod error;
mod reporter;
mod template;

pub use builder::{BuildOutput, PageBuilder, PageBuilderConfig, WrittenPage, extract_title};
pub use error::BuildError;
pub use reporter::{BuildReporter, SilentReporter};
pub use template::{PAGE_SHELL, PageValues, Placeholder, RenderedPage, render_template, size_kb};
