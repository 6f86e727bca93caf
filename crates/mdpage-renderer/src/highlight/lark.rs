//! Lark parser grammar definitions.

use std::sync::LazyLock;

use super::grammar::{Grammar, GrammarSpec, RuleSpec, TokenClass};

const BACKSLASH_ESCAPE: RuleSpec = RuleSpec {
    class: TokenClass::CharEscape,
    pattern: r"\\[\s\S]",
    children: &[],
};

const RULE_NAME: RuleSpec = RuleSpec {
    class: TokenClass::Title,
    pattern: r"(?i)^[a-z_][a-z0-9_]*",
    children: &[],
};

/// Lark rules, highest precedence first.
pub static LARK_SPEC: GrammarSpec = GrammarSpec {
    name: "Lark",
    aliases: &["lark"],
    rules: &[
        RuleSpec {
            class: TokenClass::Comment,
            pattern: r"//.*",
            children: &[],
        },
        RuleSpec {
            class: TokenClass::Comment,
            pattern: r"#.*",
            children: &[],
        },
        RuleSpec {
            class: TokenClass::String,
            pattern: r#""(?:\\[\s\S]|[^"\\])*""#,
            children: &[BACKSLASH_ESCAPE],
        },
        // Regex literal: /.../
        RuleSpec {
            class: TokenClass::Symbol,
            pattern: r"/(?:\\.|[^\\/\n])+?/",
            children: &[],
        },
        // Rule definition: name:
        RuleSpec {
            class: TokenClass::Symbol,
            pattern: r"(?mi)^[a-z_][a-z0-9_]*\s*:",
            children: &[RULE_NAME],
        },
        // Terminal names
        RuleSpec {
            class: TokenClass::Keyword,
            pattern: r"\b[A-Z][A-Z0-9_]*\b",
            children: &[],
        },
        RuleSpec {
            class: TokenClass::Operator,
            pattern: r"->|:|\*|\+|\?|\||\(|\)",
            children: &[],
        },
        // Directives: %import, %ignore, ...
        RuleSpec {
            class: TokenClass::Meta,
            pattern: r"%[a-zA-Z_]+",
            children: &[],
        },
    ],
};

/// Compiled Lark grammar.
pub static LARK: LazyLock<Grammar> =
    LazyLock::new(|| Grammar::compile(&LARK_SPEC).expect("invalid Lark grammar"));
