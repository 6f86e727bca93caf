//! HTML output helpers.

use std::fmt::Write;

/// Escape text for use in HTML content or attribute values.
///
/// Escapes the same set of characters as highlight.js, so plain and
/// highlighted code blocks are byte-compatible.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Write a highlighted code block.
///
/// `html` must already be escaped; `language` is the resolved highlighting
/// language and becomes part of the class list.
pub(crate) fn code_block(language: &str, html: &str, out: &mut String) {
    write!(
        out,
        r#"<pre><code class="hljs {}">{html}</code></pre>"#,
        escape_html(language)
    )
    .unwrap();
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_code_block_shape() {
        let mut out = String::new();
        code_block("plaintext", "a &lt; b", &mut out);
        assert_eq!(
            out,
            "<pre><code class=\"hljs plaintext\">a &lt; b</code></pre>\n"
        );
    }
}
