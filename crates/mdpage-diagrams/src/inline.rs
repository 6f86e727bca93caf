//! Local SVG image inlining.
//!
//! Markdown image references whose target ends in `.svg` are replaced by the
//! content of the referenced file, so the page has no external image
//! dependencies. Paths are resolved against the document's directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiagramError;

static SVG_IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.+?\.svg)\)").unwrap());

/// Result of inlining SVG images with potential warnings.
#[derive(Debug)]
pub struct InlineResult {
    /// Text with every resolvable SVG reference replaced.
    pub text: String,
    /// Number of references replaced.
    pub inlined: usize,
    /// Warnings generated while inlining (e.g., missing files).
    pub warnings: Vec<String>,
}

/// Replaces `![alt](file.svg)` references with the referenced SVG markup.
#[derive(Debug, Clone)]
pub struct SvgInliner {
    base_dir: PathBuf,
}

impl SvgInliner {
    /// Create an inliner resolving relative paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create an inliner for the document at `path`.
    #[must_use]
    pub fn for_document(path: &Path) -> Self {
        Self::new(path.parent().unwrap_or_else(|| Path::new("")))
    }

    /// Inline every local SVG reference in `text`.
    ///
    /// A reference to a missing file is kept verbatim and reported as a
    /// warning. Any other read failure is an error.
    pub fn inline(&self, text: &str) -> Result<InlineResult, DiagramError> {
        let mut output = String::with_capacity(text.len());
        let mut warnings = Vec::new();
        let mut inlined = 0;
        let mut last = 0;

        for caps in SVG_IMAGE_PATTERN.captures_iter(text) {
            let full_match = caps.get(0).unwrap();
            let target = &caps[1];
            let path = self.base_dir.join(target);

            output.push_str(&text[last..full_match.start()]);
            last = full_match.end();

            match fs::read_to_string(&path) {
                Ok(svg) => {
                    output.push_str("\n\n");
                    output.push_str(&svg);
                    output.push_str("\n\n");
                    inlined += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    let warning = format!("SVG file not found: {target}");
                    tracing::warn!("{warning}");
                    warnings.push(warning);
                    output.push_str(full_match.as_str());
                }
                Err(e) => return Err(DiagramError::io(&path, e)),
            }
        }
        output.push_str(&text[last..]);

        Ok(InlineResult {
            text: output,
            inlined,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_inline_existing_svg() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("img")).unwrap();
        fs::write(tmp.path().join("img/a.svg"), "<svg>a</svg>").unwrap();

        let result = SvgInliner::new(tmp.path())
            .inline("See ![diagram](img/a.svg) here.")
            .unwrap();

        assert_eq!(result.text, "See \n\n<svg>a</svg>\n\n here.");
        assert_eq!(result.inlined, 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_svg_kept_with_warning() {
        let tmp = TempDir::new().unwrap();

        let result = SvgInliner::new(tmp.path())
            .inline("![x](missing.svg)")
            .unwrap();

        assert_eq!(result.text, "![x](missing.svg)");
        assert_eq!(result.inlined, 0);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings, vec!["SVG file not found: missing.svg"]);
    }

    #[test]
    fn test_non_svg_images_untouched() {
        let tmp = TempDir::new().unwrap();
        let input = "![photo](pic.png) and ![graph](chart.svgz)";

        let result = SvgInliner::new(tmp.path()).inline(input).unwrap();

        assert_eq!(result.text, input);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_multiple_references_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.svg"), "<svg>a</svg>").unwrap();
        fs::write(tmp.path().join("b.svg"), "<svg>b</svg>").unwrap();

        let result = SvgInliner::new(tmp.path())
            .inline("![a](a.svg)\n![gone](c.svg)\n![b](b.svg)")
            .unwrap();

        assert_eq!(
            result.text,
            "\n\n<svg>a</svg>\n\n\n![gone](c.svg)\n\n\n<svg>b</svg>\n\n"
        );
        assert_eq!(result.inlined, 2);
        assert_eq!(result.warnings, vec!["SVG file not found: c.svg"]);
    }

    #[test]
    fn test_for_document_uses_parent_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("docs")).unwrap();
        fs::write(tmp.path().join("docs/fig.svg"), "<svg/>").unwrap();

        let result = SvgInliner::for_document(&tmp.path().join("docs/page.md"))
            .inline("![](fig.svg)")
            .unwrap();

        assert_eq!(result.text, "\n\n<svg/>\n\n");
    }
}
