//! HTML page shell and placeholder substitution.
//!
//! Pages are produced from a fixed shell carrying the highlight.js GitHub
//! stylesheet and the document stylesheet. The shell names exactly two
//! placeholders, `@title@` and `@bodyHtml@`, filled from [`PageValues`] in a
//! single pass: substituted text is never scanned again.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::BuildError;

static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)@").unwrap());

/// Page shell shared by the document page and the index page.
pub const PAGE_SHELL: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>@title@</title>

<!-- https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github.css -->
<style>
pre code.hljs{display:block;overflow-x:auto;padding:1em}code.hljs{padding:3px 5px}
.hljs{color:#24292e;background:#fff}.hljs-doctag,.hljs-keyword,.hljs-meta .hljs-keyword,.hljs-template-tag,.hljs-template-variable,.hljs-type,.hljs-variable.language_{color:#d73a49}.hljs-title,.hljs-title.class_,.hljs-title.class_.inherited__,.hljs-title.function_{color:#6f42c1}.hljs-attr,.hljs-attribute,.hljs-literal,.hljs-meta,.hljs-number,.hljs-operator,.hljs-selector-attr,.hljs-selector-class,.hljs-selector-id,.hljs-variable{color:#005cc5}
.hljs-meta .hljs-string,.hljs-regexp,.hljs-string{
 color:rgb(3, 98, 6)
 }
.hljs-built_in,.hljs-symbol{color:#e36209}.hljs-code,.hljs-comment,.hljs-formula{color:#6a737d}.hljs-name,.hljs-quote,.hljs-selector-pseudo,.hljs-selector-tag{color:#22863a}.hljs-subst{color:#24292e}.hljs-section{color:#005cc5;font-weight:700}.hljs-bullet{color:#735c0f}.hljs-emphasis{color:#24292e;font-style:italic}.hljs-strong{color:#24292e;font-weight:700}.hljs-addition{color:#22863a;background-color:#f0fff4}.hljs-deletion{color:#b31d28;background-color:#ffeef0}
</style>

<style>

  body {
    max-width: 800px;
    margin: auto;
    font-family: 'Georgia', serif;
    font-size: 18px;
    line-height: 1.7;
    color: #1c1c1c;
    background: #fff;
    padding: 0em 1em;
  }

  @media print {
    body {
        font-size: 14px;
    }
    @page {
        margin: 2cm;
    }
   }

  h1, h2, h3, h4, h5 {
    font-family: 'Helvetica Neue', sans-serif;
    font-weight: 600;
    line-height: 1.3;
    margin-top: 2em;
    margin-bottom: 1em;
  }

  p {
    margin: 1.5em 0;
  }

  pre {
    background: #f4f4f4;
    border-left: 4px solid #ccc;
    padding: 0em;
    overflow-x: auto;
    line-height: 1.5;
  }

  code {
    background: #f4f4f4;
    padding: 0.2em 0.4em;
    border-radius: 4px;
    font-family: 'Consolas', 'SF Mono', 'Menlo', monospace;
    font-weight: 400;
    font-size: 80%;
  }

  pre code.hljs {
    padding: 0em 1em;
  }

  img, svg {
    max-width: 100%;
    height: auto;
    display: block;
    margin: 2em auto;
  }

  blockquote {
    border-left: 4px solid #ddd;
    padding-left: 1em;
    color: #555;
    font-style: italic;
    margin: 1.5em 0;
  }

  a {
    color: #1a0dab;
    text-decoration: none;
  }

  a:hover {
    text-decoration: underline;
  }
</style>
</head>
<body>
@bodyHtml@
</body>
</html>
"#;

/// A placeholder recognized in [`PAGE_SHELL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `@title@`
    Title,
    /// `@bodyHtml@`
    BodyHtml,
}

impl Placeholder {
    /// Look up a placeholder by the name between the `@` delimiters.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "bodyHtml" => Some(Self::BodyHtml),
            _ => None,
        }
    }
}

/// Values substituted into the page shell.
///
/// Values are inserted verbatim: `title` must already be escaped for HTML and
/// `body_html` is trusted markup. An empty value leaves its placeholder empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageValues {
    pub title: String,
    pub body_html: String,
}

impl PageValues {
    fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Title => &self.title,
            Placeholder::BodyHtml => &self.body_html,
        }
    }
}

/// Substitute `values` into `shell` in a single pass.
///
/// `@name@` tokens that are not a known [`Placeholder`] are kept verbatim.
#[must_use]
pub fn render_template(shell: &str, values: &PageValues) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(shell, |caps: &Captures<'_>| match Placeholder::from_key(&caps[1]) {
            Some(placeholder) => values.get(placeholder).to_owned(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// A fully rendered page, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Output path.
    pub path: PathBuf,
    /// Complete HTML document.
    pub html: String,
}

impl RenderedPage {
    /// Render `values` into the standard page shell.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, values: &PageValues) -> Self {
        Self {
            path: path.into(),
            html: render_template(PAGE_SHELL, values),
        }
    }

    /// Write the page to its path, returning the number of bytes written.
    pub fn write(&self) -> Result<usize, BuildError> {
        fs::write(&self.path, &self.html).map_err(|e| BuildError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.html.len())
    }
}

/// Size in kilobytes, rounded half up.
#[must_use]
pub fn size_kb(bytes: usize) -> usize {
    (bytes + 512) / 1024
}
