//! Syntax highlighting for fenced code blocks.
//!
//! [`HighlightRegistry`] resolves a code block's language in two tiers:
//! custom [`Grammar`]s registered with the registry (by name or alias,
//! case-insensitive), then syntect's built-in syntax set. Anything else is
//! rendered as escaped plain text under the `plaintext` language.

mod grammar;
mod lark;

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::html::escape_html;

pub use grammar::{Grammar, GrammarSpec, RuleSpec, TokenClass};
pub use lark::{LARK, LARK_SPEC};

/// Language reported for code that could not be highlighted.
pub const PLAINTEXT: &str = "plaintext";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlighted code block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighted {
    /// Language used for highlighting (`plaintext` on fallback).
    pub language: String,
    /// Escaped HTML, without the surrounding `<pre><code>`.
    pub html: String,
}

impl Highlighted {
    /// Escaped, unhighlighted code.
    #[must_use]
    pub fn plain(code: &str) -> Self {
        Self {
            language: PLAINTEXT.to_owned(),
            html: escape_html(code),
        }
    }
}

/// Highlights the content of a code block.
///
/// Implementations never fail: unknown languages fall back to plain text.
pub trait CodeHighlighter {
    /// Highlight `code` written in `language` (if any).
    fn highlight(&self, language: Option<&str>, code: &str) -> Highlighted;
}

/// Registry of custom grammars backed by syntect's default syntaxes.
#[derive(Debug, Clone)]
pub struct HighlightRegistry {
    grammars: Vec<Grammar>,
    builtin: bool,
}

impl HighlightRegistry {
    /// Create a registry with the Lark grammar and syntect's built-in syntaxes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grammars: vec![LARK.clone()],
            builtin: true,
        }
    }

    /// Create a registry with no grammars at all; everything is plain text.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            grammars: Vec::new(),
            builtin: false,
        }
    }

    /// Register a custom grammar. Custom grammars take precedence over built-ins.
    #[must_use]
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammars.push(grammar);
        self
    }

    /// Enable or disable syntect's built-in syntaxes.
    #[must_use]
    pub fn with_builtin(mut self, enabled: bool) -> Self {
        self.builtin = enabled;
        self
    }

    /// Whether `language` resolves to a grammar.
    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.find_grammar(language).is_some()
            || (self.builtin && SYNTAX_SET.find_syntax_by_token(language).is_some())
    }

    fn find_grammar(&self, language: &str) -> Option<&Grammar> {
        self.grammars.iter().find(|g| g.matches(language))
    }

    fn highlight_builtin(language: &str, code: &str) -> Option<String> {
        let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &SYNTAX_SET,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::warn!("highlighting {language} failed: {e}");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

impl Default for HighlightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for HighlightRegistry {
    fn highlight(&self, language: Option<&str>, code: &str) -> Highlighted {
        let Some(language) = language.filter(|l| !l.is_empty()) else {
            return Highlighted::plain(code);
        };

        if let Some(grammar) = self.find_grammar(language) {
            return Highlighted {
                language: language.to_owned(),
                html: grammar.highlight(code),
            };
        }

        if self.builtin
            && let Some(html) = Self::highlight_builtin(language, code)
        {
            return Highlighted {
                language: language.to_owned(),
                html,
            };
        }

        tracing::debug!("no grammar for language '{language}', using plain text");
        Highlighted::plain(code)
    }
}
