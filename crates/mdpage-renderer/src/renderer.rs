//! Markdown to HTML body rendering.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::highlight::{CodeHighlighter, HighlightRegistry};
use crate::html::code_block;

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML body fragment.
    pub html: String,
    /// Number of code blocks rendered through the highlighter.
    pub code_blocks: usize,
}

/// Markdown renderer with pluggable code highlighting.
///
/// Everything except code blocks is rendered by pulldown-cmark's HTML writer;
/// raw HTML (such as inlined SVG) passes through unchanged. Code blocks are
/// rendered as `<pre><code class="hljs {language}">` with the content
/// produced by the configured [`CodeHighlighter`].
pub struct MarkdownRenderer {
    highlighter: Box<dyn CodeHighlighter>,
    gfm: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled and the default highlight registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            highlighter: Box::new(HighlightRegistry::new()),
            gfm: true,
        }
    }

    /// Use a different code highlighter.
    #[must_use]
    pub fn with_highlighter<H: CodeHighlighter + 'static>(mut self, highlighter: H) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text directly using configured parser options.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> RenderResult {
        self.render(self.create_parser(markdown))
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut events = CodeBlockEvents {
            inner: events,
            highlighter: self.highlighter.as_ref(),
            count: 0,
        };
        let mut html = String::with_capacity(4096);
        html::push_html(&mut html, &mut events);

        RenderResult {
            html,
            code_blocks: events.count,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Event adapter replacing each code block with a single highlighted HTML event.
struct CodeBlockEvents<'h, I> {
    inner: I,
    highlighter: &'h dyn CodeHighlighter,
    count: usize,
}

impl<'a, I> Iterator for CodeBlockEvents<'_, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = match self.inner.next()? {
            Event::Start(Tag::CodeBlock(kind)) => kind,
            event => return Some(event),
        };

        let language = match &kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
            CodeBlockKind::Indented => None,
        };

        let mut source = String::new();
        for event in self.inner.by_ref() {
            match event {
                Event::Text(text) => source.push_str(&text),
                Event::End(TagEnd::CodeBlock) => break,
                _ => {}
            }
        }
        if source.ends_with('\n') {
            source.pop();
        }

        let highlighted = self.highlighter.highlight(language, &source);
        self.count += 1;

        let mut out = String::with_capacity(highlighted.html.len() + 48);
        code_block(&highlighted.language, &highlighted.html, &mut out);
        Some(Event::Html(CowStr::from(out)))
    }
}
