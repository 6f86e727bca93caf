//! Diagram extraction and substitution.
//!
//! This module provides [`DiagramProcessor`], which replaces every diagram
//! block in a document with the content of its rendered SVG, rendering only
//! blocks whose image is not already cached.

use std::path::PathBuf;

use crate::cache::DiagramStore;
use crate::error::DiagramError;
use crate::mermaid::DiagramRenderer;
use crate::scanner::{DiagramBlock, DiagramScanner, Segment};

/// Default fence tag for diagram blocks.
const DEFAULT_LANGUAGE: &str = "mermaid";

/// Result of processing a document's diagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    /// Document text with every diagram block replaced by its SVG.
    pub text: String,
    /// Number of diagram blocks replaced.
    pub count: usize,
    /// Number of blocks that required an external render.
    pub rendered: usize,
}

/// Replaces fenced diagram blocks with cached or freshly rendered SVG.
///
/// # Example
///
/// ```ignore
/// use mdpage_diagrams::{DiagramProcessor, MermaidCli};
///
/// let processor = DiagramProcessor::new("tmp", Box::new(MermaidCli::new("mmdc", "mermaid.json")));
/// let processed = processor.process("```mermaid\ngraph TD\nA --> B\n```")?;
/// assert_eq!(processed.count, 1);
/// ```
pub struct DiagramProcessor {
    language: String,
    store: DiagramStore,
    renderer: Box<dyn DiagramRenderer>,
}

impl DiagramProcessor {
    /// Create a processor caching images under `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, renderer: Box<dyn DiagramRenderer>) -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            store: DiagramStore::new(output_dir),
            renderer,
        }
    }

    /// Set the fence tag that marks diagram blocks (default: `mermaid`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Process `document` without progress reporting.
    pub fn process(&self, document: &str) -> Result<ProcessedDocument, DiagramError> {
        self.process_with_progress(document, |_| {})
    }

    /// Process `document`, calling `on_render` before each external render.
    ///
    /// The whole document is scanned before anything touches the disk, so an
    /// unclosed block aborts without side effects. Blocks are then handled
    /// strictly in document order; a block whose image exists (from this run
    /// or an earlier one) is reused without rendering.
    pub fn process_with_progress(
        &self,
        document: &str,
        mut on_render: impl FnMut(&DiagramBlock<'_>),
    ) -> Result<ProcessedDocument, DiagramError> {
        let segments = DiagramScanner::new(document, &self.language)
            .collect::<Result<Vec<_>, _>>()?;

        self.store.ensure_dir()?;

        let needs_render = segments
            .iter()
            .filter_map(Segment::as_diagram)
            .any(|block| !self.store.contains(&block.id));
        if needs_render {
            self.renderer.check()?;
        }

        let mut text = String::with_capacity(document.len());
        let mut count = 0;
        let mut rendered = 0;

        for segment in &segments {
            match segment {
                Segment::Text(chunk) => text.push_str(chunk),
                Segment::Diagram(block) => {
                    if self.store.contains(&block.id) {
                        tracing::debug!(id = %block.id, "diagram cache hit");
                    } else {
                        on_render(block);
                        self.render_block(block)?;
                        rendered += 1;
                    }

                    let svg = self.store.read_svg(&block.id)?;
                    text.push_str("\n\n");
                    text.push_str(&svg);
                    text.push_str("\n\n");
                    count += 1;
                }
            }
        }

        Ok(ProcessedDocument {
            text,
            count,
            rendered,
        })
    }

    /// Write the block's source, render it, and remove the source again.
    ///
    /// A failed render leaves no image behind for the next run to reuse.
    fn render_block(&self, block: &DiagramBlock<'_>) -> Result<(), DiagramError> {
        let source_path = self.store.write_source(&block.id, block.source)?;
        let svg_path = self.store.svg_path(&block.id);

        let result = self.renderer.render(&source_path, &svg_path);
        self.store.remove_source(&source_path);
        if result.is_err() {
            self.store.discard_svg(&block.id);
        }
        result?;

        tracing::info!(id = %block.id, line = block.line, "rendered diagram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::cache::DiagramId;

    /// Renderer that wraps the diagram source in an `<svg>` element and logs calls.
    #[derive(Clone, Default)]
    struct FakeRenderer {
        calls: Rc<RefCell<Vec<String>>>,
        unavailable: bool,
        fail: bool,
        partial_output: bool,
    }

    impl DiagramRenderer for FakeRenderer {
        fn check(&self) -> Result<(), DiagramError> {
            if self.unavailable {
                return Err(DiagramError::RendererUnavailable("fake".to_owned()));
            }
            Ok(())
        }

        fn render(&self, input: &Path, output: &Path) -> Result<(), DiagramError> {
            let source = fs::read_to_string(input).unwrap();
            self.calls.borrow_mut().push(source.clone());
            if self.partial_output {
                fs::write(output, "<svg").unwrap();
            }
            if self.fail {
                return Err(DiagramError::RenderFailed {
                    input: input.to_path_buf(),
                    message: "exit status: 1".to_owned(),
                });
            }
            fs::write(output, format!("<svg>{source}</svg>")).unwrap();
            Ok(())
        }
    }

    fn processor(dir: &Path, renderer: &FakeRenderer) -> DiagramProcessor {
        DiagramProcessor::new(dir.join("tmp"), Box::new(renderer.clone()))
    }

    #[test]
    fn test_document_without_diagrams_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer {
            unavailable: true,
            ..FakeRenderer::default()
        };

        let result = processor(tmp.path(), &renderer)
            .process("# Title\n\nText.\n")
            .unwrap();

        assert_eq!(result.text, "# Title\n\nText.\n");
        assert_eq!(result.count, 0);
        assert!(renderer.calls.borrow().is_empty());
    }

    #[test]
    fn test_blocks_replaced_in_order_with_padding() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();
        let input = "a\n```mermaid\nA\n```\nb\n```mermaid\nB\n```\nc\n```mermaid\nC\n```\nd";

        let result = processor(tmp.path(), &renderer).process(input).unwrap();

        assert_eq!(
            result.text,
            "a\n\n\n<svg>A</svg>\n\n\nb\n\n\n<svg>B</svg>\n\n\nc\n\n\n<svg>C</svg>\n\n\nd"
        );
        assert_eq!(result.count, 3);
        assert_eq!(result.rendered, 3);
        assert_eq!(*renderer.calls.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_identical_sources_render_once() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();
        let input = "```mermaid\nA --> B\n```\n\n```mermaid\n\n  A --> B\n```";

        let result = processor(tmp.path(), &renderer).process(input).unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.rendered, 1);
        assert_eq!(renderer.calls.borrow().len(), 1);
        assert_eq!(result.text.matches("<svg>A --> B</svg>").count(), 2);
    }

    #[test]
    fn test_second_run_uses_cache() {
        let tmp = TempDir::new().unwrap();
        let input = "```mermaid\ngraph TD\nA --> B\n```";

        let first = FakeRenderer::default();
        let first_result = processor(tmp.path(), &first).process(input).unwrap();
        let svg_path = tmp
            .path()
            .join("tmp")
            .join(format!("mermaid_{}.svg", DiagramId::from_source("graph TD\nA --> B")));
        let svg_before = fs::read_to_string(&svg_path).unwrap();

        // The renderer is not even required on a fully cached run.
        let second = FakeRenderer {
            unavailable: true,
            ..FakeRenderer::default()
        };
        let second_result = processor(tmp.path(), &second).process(input).unwrap();

        assert_eq!(first.calls.borrow().len(), 1);
        assert!(second.calls.borrow().is_empty());
        assert_eq!(second_result.rendered, 0);
        assert_eq!(first_result.text, second_result.text);
        assert_eq!(fs::read_to_string(&svg_path).unwrap(), svg_before);
    }

    #[test]
    fn test_transient_source_removed() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();

        processor(tmp.path(), &renderer)
            .process("```mermaid\nA\n```")
            .unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path().join("tmp"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![format!("mermaid_{}.svg", DiagramId::from_source("A"))]);
    }

    #[test]
    fn test_unclosed_block_aborts_without_side_effects() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();

        let err = processor(tmp.path(), &renderer)
            .process("```mermaid\nA\n```\n```mermaid\nB\n")
            .unwrap_err();

        assert!(matches!(err, DiagramError::UnclosedBlock { line: 4, .. }));
        assert!(renderer.calls.borrow().is_empty());
        assert!(!tmp.path().join("tmp").exists());
    }

    #[test]
    fn test_unavailable_renderer_fails_before_rendering() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer {
            unavailable: true,
            ..FakeRenderer::default()
        };

        let err = processor(tmp.path(), &renderer)
            .process("```mermaid\nA\n```")
            .unwrap_err();

        assert!(matches!(err, DiagramError::RendererUnavailable(_)));
        assert!(renderer.calls.borrow().is_empty());
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer {
            fail: true,
            ..FakeRenderer::default()
        };

        let err = processor(tmp.path(), &renderer)
            .process("```mermaid\nA\n```\n```mermaid\nB\n```")
            .unwrap_err();

        assert!(matches!(err, DiagramError::RenderFailed { .. }));
        // Aborted at the first block
        assert_eq!(renderer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_progress_reports_uncached_blocks_only() {
        let tmp = TempDir::new().unwrap();
        let renderer = FakeRenderer::default();
        let diagrams = processor(tmp.path(), &renderer);
        diagrams.process("```mermaid\nB\n```").unwrap();

        let mut reported = Vec::new();
        let input = "```mermaid\nA\n```\n```mermaid\nB\n```\n```mermaid\nC\n```";
        diagrams
            .process_with_progress(input, |b| reported.push(b.ordinal + 1))
            .unwrap();

        assert_eq!(reported, vec![1, 3]);
    }

    #[test]
    fn test_failed_render_leaves_no_cached_image() {
        let tmp = TempDir::new().unwrap();
        let input = "```mermaid\nA\n```";
        let broken = FakeRenderer {
            fail: true,
            partial_output: true,
            ..FakeRenderer::default()
        };

        processor(tmp.path(), &broken).process(input).unwrap_err();
        let svg_path = tmp
            .path()
            .join("tmp")
            .join(format!("mermaid_{}.svg", DiagramId::from_source("A")));
        assert!(!svg_path.exists());

        let working = FakeRenderer::default();
        let result = processor(tmp.path(), &working).process(input).unwrap();
        assert_eq!(result.rendered, 1);
        assert_eq!(result.text, "\n\n<svg>A</svg>\n\n");
    }
}
