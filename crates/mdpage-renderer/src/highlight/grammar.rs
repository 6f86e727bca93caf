//! Regex-based highlighting grammars.
//!
//! A grammar is declared as a static table of [`RuleSpec`]s and compiled once
//! into a [`Grammar`]. Tokenizing repeatedly picks the rule whose match starts
//! leftmost from the current position; when several rules match at the same
//! position the one listed first wins. Text no rule matches is emitted as
//! escaped plain text. A rule's sub-rules are applied to the text it matched.

use std::fmt::Write;

use regex::Regex;

use crate::html::escape_html;

/// Token classification, rendered as highlight.js CSS classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Comment,
    String,
    CharEscape,
    Symbol,
    Title,
    Keyword,
    Operator,
    Meta,
}

impl TokenClass {
    /// CSS class list for the token's `<span>`.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Comment => "hljs-comment",
            Self::String => "hljs-string",
            Self::CharEscape => "hljs-char escape_",
            Self::Symbol => "hljs-symbol",
            Self::Title => "hljs-title",
            Self::Keyword => "hljs-keyword",
            Self::Operator => "hljs-operator",
            Self::Meta => "hljs-meta",
        }
    }
}

/// Declarative highlighting rule.
#[derive(Debug)]
pub struct RuleSpec {
    pub class: TokenClass,
    pub pattern: &'static str,
    pub children: &'static [RuleSpec],
}

/// Declarative grammar: a name, aliases and rules in precedence order.
#[derive(Debug)]
pub struct GrammarSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub rules: &'static [RuleSpec],
}

#[derive(Debug, Clone)]
struct Rule {
    class: TokenClass,
    regex: Regex,
    children: Vec<Rule>,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Result<Self, regex::Error> {
        Ok(Self {
            class: spec.class,
            regex: Regex::new(spec.pattern)?,
            children: compile_rules(spec.children)?,
        })
    }
}

fn compile_rules(specs: &[RuleSpec]) -> Result<Vec<Rule>, regex::Error> {
    specs.iter().map(Rule::compile).collect()
}

/// Compiled, immutable highlighting grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    aliases: Vec<String>,
    rules: Vec<Rule>,
}

impl Grammar {
    /// Compile a grammar from its declarative table.
    pub fn compile(spec: &GrammarSpec) -> Result<Self, regex::Error> {
        Ok(Self {
            name: spec.name.to_owned(),
            aliases: spec.aliases.iter().map(|&a| a.to_owned()).collect(),
            rules: compile_rules(spec.rules)?,
        })
    }

    /// Display name of the grammar.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `language` names this grammar (case-insensitive).
    #[must_use]
    pub fn matches(&self, language: &str) -> bool {
        self.name.eq_ignore_ascii_case(language)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(language))
    }

    /// Highlight `code`, returning escaped HTML with `<span>` tokens.
    #[must_use]
    pub fn highlight(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len() * 2);
        tokenize(&self.rules, code, &mut out);
        out
    }
}

fn tokenize(rules: &[Rule], text: &str, out: &mut String) {
    // Next match of each rule; a rule is searched again only once the
    // emitted tokens have moved past the start of its cached match.
    let mut next: Vec<Option<regex::Match<'_>>> = rules
        .iter()
        .map(|rule| first_nonempty_match(&rule.regex, text, 0))
        .collect();
    let mut pos = 0;
    while pos < text.len() {
        for (slot, rule) in next.iter_mut().zip(rules) {
            if slot.is_some_and(|m| m.start() < pos) {
                *slot = first_nonempty_match(&rule.regex, text, pos);
            }
        }

        let best = next
            .iter()
            .enumerate()
            .filter_map(|(index, m)| m.map(|m| (index, m)))
            .min_by_key(|&(index, m)| (m.start(), index));
        let Some((index, m)) = best else {
            break;
        };
        let rule = &rules[index];

        out.push_str(&escape_html(&text[pos..m.start()]));
        write!(out, r#"<span class="{}">"#, rule.class.css_class()).unwrap();
        if rule.children.is_empty() {
            out.push_str(&escape_html(m.as_str()));
        } else {
            tokenize(&rule.children, m.as_str(), out);
        }
        out.push_str("</span>");
        pos = m.end();
    }
    out.push_str(&escape_html(&text[pos..]));
}

fn first_nonempty_match<'t>(regex: &Regex, text: &'t str, from: usize) -> Option<regex::Match<'t>> {
    let mut start = from;
    while start <= text.len() {
        let m = regex.find_at(text, start)?;
        if !m.is_empty() {
            return Some(m);
        }
        start = m.end() + text[m.end()..].chars().next().map_or(1, char::len_utf8);
    }
    None
}
