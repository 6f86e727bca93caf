//! Markdown rendering with syntax highlighting for mdpage.
//!
//! This crate provides [`MarkdownRenderer`], which turns Markdown into an
//! HTML body fragment, and the [`HighlightRegistry`] used for its code blocks.
//!
//! # Architecture
//!
//! - [`MarkdownRenderer`]: pulldown-cmark with GFM extensions; code blocks are
//!   intercepted and rendered as `<pre><code class="hljs {language}">`
//! - [`HighlightRegistry`]: custom regex grammars (Lark) first, then
//!   syntect's default syntaxes, then plain text
//! - [`CodeHighlighter`]: the seam between the two
//!
//! # Example
//!
//! ```
//! use mdpage_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render_markdown("```lark\nstart: NAME\n```");
//! assert!(result.html.contains(r#"class="hljs lark""#));
//! ```

pub mod highlight;
mod html;
mod renderer;

pub use highlight::{CodeHighlighter, Grammar, HighlightRegistry, Highlighted};
pub use html::escape_html;
pub use renderer::{MarkdownRenderer, RenderResult};
