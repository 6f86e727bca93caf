//! Document build pipeline.
//!
//! Provides [`PageBuilder`], which turns one Markdown document into the
//! primary HTML page and the index page linking to it:
//!
//! ```text
//! read -> diagrams -> SVG images -> title -> markdown -> pages -> write
//! ```
//!
//! Both pages are fully rendered before either is written, so a failing
//! stage never leaves partial output behind.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use mdpage_config::{Config, DiagramsConfig, IndexConfig, OutputConfig};
use mdpage_diagrams::{DiagramProcessor, DiagramRenderer, MermaidCli, SvgInliner};
use mdpage_renderer::{MarkdownRenderer, escape_html};
use regex::Regex;

use crate::error::BuildError;
use crate::reporter::BuildReporter;
use crate::template::{PageValues, RenderedPage};

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]+(\S.*?)[ \t\r]*$").unwrap());

/// Configuration for [`PageBuilder`].
#[derive(Clone, Debug, Default)]
pub struct PageBuilderConfig {
    /// Diagram fence tag, cache directory and renderer settings.
    pub diagrams: DiagramsConfig,
    /// Output page paths and fallback title.
    pub output: OutputConfig,
    /// Index page content.
    pub index: IndexConfig,
}

impl From<&Config> for PageBuilderConfig {
    fn from(config: &Config) -> Self {
        Self {
            diagrams: config.diagrams_resolved.clone(),
            output: config.output_resolved.clone(),
            index: config.index.clone(),
        }
    }
}

/// Summary of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Title derived from the document.
    pub title: String,
    /// Diagram blocks replaced by SVG.
    pub diagrams: usize,
    /// Diagram blocks that needed an external render (cache misses).
    pub rendered: usize,
    /// Local SVG images inlined.
    pub inlined: usize,
    /// Recoverable problems encountered.
    pub warnings: Vec<String>,
    /// The primary page.
    pub page: WrittenPage,
    /// The index page.
    pub index: WrittenPage,
}

/// A page written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Builds the primary page and the index page from a Markdown document.
///
/// # Example
///
/// ```ignore
/// use mdpage_builder::{PageBuilder, PageBuilderConfig, SilentReporter};
/// use mdpage_config::Config;
///
/// let config = Config::load(None, None)?;
/// let builder = PageBuilder::new(PageBuilderConfig::from(&config));
/// let output = builder.build(Path::new("README.md"), &SilentReporter)?;
/// println!("{} diagrams", output.diagrams);
/// ```
pub struct PageBuilder {
    diagrams: DiagramProcessor,
    markdown: MarkdownRenderer,
    output: OutputConfig,
    index: IndexConfig,
}

impl PageBuilder {
    /// Create a builder rendering diagrams with the Mermaid CLI.
    #[must_use]
    pub fn new(config: PageBuilderConfig) -> Self {
        let renderer = MermaidCli::new(
            config.diagrams.command.clone(),
            config.diagrams.config_file.clone(),
        );
        Self::with_renderer(config, Box::new(renderer))
    }

    /// Create a builder with a custom diagram renderer.
    #[must_use]
    pub fn with_renderer(config: PageBuilderConfig, renderer: Box<dyn DiagramRenderer>) -> Self {
        let diagrams = DiagramProcessor::new(config.diagrams.output_dir, renderer)
            .language(config.diagrams.language);
        Self {
            diagrams,
            markdown: MarkdownRenderer::new(),
            output: config.output,
            index: config.index,
        }
    }

    /// Build both pages from the document at `input`.
    pub fn build(
        &self,
        input: &Path,
        reporter: &dyn BuildReporter,
    ) -> Result<BuildOutput, BuildError> {
        let document = fs::read_to_string(input).map_err(|e| BuildError::Read {
            path: input.to_path_buf(),
            source: e,
        })?;

        let processed = self
            .diagrams
            .process_with_progress(&document, |block| {
                reporter.diagram_rendering(block.ordinal + 1);
            })?;
        reporter.diagrams_processed(processed.count);

        let inlined = SvgInliner::for_document(input).inline(&processed.text)?;
        for warning in &inlined.warnings {
            reporter.warning(warning);
        }

        let title = extract_title(&document)
            .unwrap_or(self.output.default_title.as_str())
            .to_owned();
        let body_html = self.markdown.render_markdown(&inlined.text).html;
        tracing::debug!(title = %title, bytes = body_html.len(), "rendered document body");

        let page = RenderedPage::new(
            &self.output.page,
            &PageValues {
                title: escape_html(&title),
                body_html,
            },
        );
        let index = RenderedPage::new(
            &self.output.index,
            &PageValues {
                title: escape_html(&self.index.title),
                body_html: self.index_body(&title),
            },
        );

        let page_bytes = page.write()?;
        reporter.page_written(&page.path, page_bytes);
        let index_bytes = index.write()?;
        reporter.page_written(&index.path, index_bytes);

        Ok(BuildOutput {
            title,
            diagrams: processed.count,
            rendered: processed.rendered,
            inlined: inlined.inlined,
            warnings: inlined.warnings,
            page: WrittenPage {
                path: page.path,
                bytes: page_bytes,
            },
            index: WrittenPage {
                path: index.path,
                bytes: index_bytes,
            },
        })
    }

    /// Body of the index page, linking to the project and the primary page.
    fn index_body(&self, title: &str) -> String {
        let href = page_href(&self.output.index, &self.output.page);
        format!(
            "\n<h1>{}</h1>\n<p>\nPlease checkout the <a href=\"{}\">GitHub repository</a> for more information,\nor read the blog entry <a href=\"{}\">{}</a>.\n</p>\n",
            escape_html(&self.index.title),
            escape_html(&self.index.project_url),
            escape_html(&href),
            escape_html(title),
        )
    }
}

/// Extract the page title from the first heading line of `document`.
///
/// Matches one or more `#` at line start followed by whitespace; the rest of
/// the line (trailing whitespace trimmed) is the title. Blank headings are
/// skipped.
#[must_use]
pub fn extract_title(document: &str) -> Option<&str> {
    TITLE_PATTERN
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Link target for `page` as seen from the page at `from`.
fn page_href(from: &Path, page: &Path) -> String {
    match from.parent().and_then(|dir| page.strip_prefix(dir).ok()) {
        Some(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => page.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use mdpage_diagrams::DiagramError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::reporter::SilentReporter;

    #[derive(Clone, Default)]
    struct FakeRenderer {
        calls: Rc<Cell<usize>>,
    }

    impl DiagramRenderer for FakeRenderer {
        fn check(&self) -> Result<(), DiagramError> {
            Ok(())
        }

        fn render(&self, input: &Path, output: &Path) -> Result<(), DiagramError> {
            self.calls.set(self.calls.get() + 1);
            let source = fs::read_to_string(input).unwrap();
            fs::write(output, format!("<svg>{source}</svg>")).unwrap();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: std::cell::RefCell<Vec<String>>,
    }

    impl BuildReporter for RecordingReporter {
        fn diagram_rendering(&self, number: usize) {
            self.events.borrow_mut().push(format!("render {number}"));
        }

        fn diagrams_processed(&self, count: usize) {
            self.events.borrow_mut().push(format!("processed {count}"));
        }

        fn warning(&self, message: &str) {
            self.events.borrow_mut().push(format!("warn {message}"));
        }

        fn page_written(&self, path: &Path, _bytes: usize) {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.events.borrow_mut().push(format!("wrote {name}"));
        }
    }

    fn config(dir: &Path) -> PageBuilderConfig {
        PageBuilderConfig {
            diagrams: DiagramsConfig {
                output_dir: dir.join("tmp"),
                ..DiagramsConfig::default()
            },
            output: OutputConfig {
                page: dir.join("llg-brr.html"),
                index: dir.join("index.html"),
                ..OutputConfig::default()
            },
            index: IndexConfig::default(),
        }
    }

    fn builder(dir: &Path, renderer: &FakeRenderer) -> PageBuilder {
        PageBuilder::with_renderer(config(dir), Box::new(renderer.clone()))
    }

    fn write_input(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("doc.md");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("# Hello World\n\ntext"), Some("Hello World"));
        assert_eq!(extract_title("intro\n## Section  \n# Later"), Some("Section"));
        assert_eq!(extract_title("#NoSpace\ntext"), None);
        assert_eq!(extract_title("no headings"), None);
    }

    #[test]
    fn test_extract_title_skips_blank_heading() {
        assert_eq!(extract_title("#   \n# Real\n"), Some("Real"));
        assert_eq!(extract_title("## \t\r\ntext"), None);
    }

    #[test]
    fn test_page_href() {
        assert_eq!(
            page_href(Path::new("/out/index.html"), Path::new("/out/llg-brr.html")),
            "llg-brr.html"
        );
        assert_eq!(
            page_href(Path::new("/out/index.html"), Path::new("/out/blog/post.html")),
            "blog/post.html"
        );
    }

    #[test]
    fn test_build_writes_both_pages() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();
        let input = write_input(
            tmp.path(),
            "# Hello World\n\n```mermaid\ngraph TD\n```\n\n```lark\nstart: A\n```\n",
        );

        let output = builder(tmp.path(), &renderer)
            .build(&input, &SilentReporter)
            .unwrap();

        assert_eq!(output.title, "Hello World");
        assert_eq!(output.diagrams, 1);
        assert_eq!(output.rendered, 1);

        let page = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        assert!(page.contains("<title>Hello World</title>"));
        assert!(page.contains("<svg>graph TD</svg>"));
        assert!(page.contains(r#"<pre><code class="hljs lark">"#));
        assert!(!page.contains("```mermaid"));

        let index = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(index.contains("<title>LLGuidance</title>"));
        assert!(index.contains("<h1>LLGuidance</h1>"));
        assert!(index.contains(
            r#"<a href="https://github.com/guidance-ai/llguidance">GitHub repository</a>"#
        ));
        assert!(index.contains(r#"<a href="llg-brr.html">Hello World</a>"#));
        assert_eq!(output.index.bytes, index.len());
    }

    #[test]
    fn test_default_title_without_heading() {
        let tmp = TempDir::new().unwrap();
        let input = write_input(tmp.path(), "Just a paragraph.\n");

        let output = builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &SilentReporter)
            .unwrap();

        assert_eq!(output.title, "Rendered Markdown");
        let page = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        assert!(page.contains("<title>Rendered Markdown</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let tmp = TempDir::new().unwrap();
        let input = write_input(tmp.path(), "# A <b> & C\n");

        builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &SilentReporter)
            .unwrap();

        let page = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        assert!(page.contains("<title>A &lt;b&gt; &amp; C</title>"));
    }

    #[test]
    fn test_second_build_uses_diagram_cache() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();
        let input = write_input(tmp.path(), "```mermaid\nA\n```\n```mermaid\nA\n```\n");
        let builder = builder(tmp.path(), &renderer);

        let first = builder.build(&input, &SilentReporter).unwrap();
        let page_before = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        let second = builder.build(&input, &SilentReporter).unwrap();

        assert_eq!(renderer.calls.get(), 1);
        assert_eq!((first.diagrams, first.rendered), (2, 1));
        assert_eq!((second.diagrams, second.rendered), (2, 0));
        assert_eq!(
            fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap(),
            page_before
        );
    }

    #[test]
    fn test_unclosed_block_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let input = write_input(tmp.path(), "# T\n\n```mermaid\ngraph TD\n");

        let err = builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &SilentReporter)
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Diagram(DiagramError::UnclosedBlock { line: 3, .. })
        ));
        assert!(!tmp.path().join("llg-brr.html").exists());
        assert!(!tmp.path().join("index.html").exists());
    }

    #[test]
    fn test_missing_svg_image_warns_and_succeeds() {
        let tmp = TempDir::new().unwrap();
        let input = write_input(tmp.path(), "# T\n\n![x](missing.svg)\n");
        let reporter = RecordingReporter::default();

        let output = builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &reporter)
            .unwrap();

        assert_eq!(output.warnings.len(), 1);
        let page = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        assert!(page.contains(r#"<img src="missing.svg" alt="x" />"#));
        assert_eq!(reporter.events.borrow()[1], "warn SVG file not found: missing.svg");
    }

    #[test]
    fn test_local_svg_image_inlined() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("fig.svg"), "<svg id=\"fig\"></svg>").unwrap();
        let input = write_input(tmp.path(), "# T\n\n![figure](fig.svg)\n");

        let output = builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &SilentReporter)
            .unwrap();

        assert_eq!(output.inlined, 1);
        let page = fs::read_to_string(tmp.path().join("llg-brr.html")).unwrap();
        assert!(page.contains("<svg id=\"fig\"></svg>"));
    }

    #[test]
    fn test_reporter_event_order() {
        let tmp = TempDir::new().unwrap();
        let input = write_input(tmp.path(), "```mermaid\nA\n```\n```mermaid\nB\n```\n");
        let reporter = RecordingReporter::default();

        builder(tmp.path(), &FakeRenderer::default())
            .build(&input, &reporter)
            .unwrap();

        assert_eq!(
            *reporter.events.borrow(),
            vec![
                "render 1",
                "render 2",
                "processed 2",
                "wrote llg-brr.html",
                "wrote index.html",
            ]
        );
    }

    #[test]
    fn test_missing_input_is_read_error() {
        let tmp = TempDir::new().unwrap();

        let err = builder(tmp.path(), &FakeRenderer::default())
            .build(&tmp.path().join("nope.md"), &SilentReporter)
            .unwrap_err();

        assert!(matches!(err, BuildError::Read { .. }));
        assert!(!tmp.path().join("tmp").exists());
    }
}
