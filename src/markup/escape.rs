//! HTML escaping and the reverse direction for plain-text display.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE regex pattern is valid"));

static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<br>|<hr[^>]*>|</(?:h2|h3|li|p|div|ul|ol)>").expect("BREAK_RE regex pattern is valid")
});

/// Escape the five HTML-significant characters.
///
/// After escaping, a literal `<` can only come from markup the formatter
/// emits itself.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Undo [`escape_html`].
#[must_use]
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Flatten rendered markup into readable plain text (used by terminal
/// front-ends). Block ends and `<br>` become newlines; at most one blank line
/// survives between blocks.
#[must_use]
pub fn to_plain_text(markup: &str) -> String {
    let broken = BREAK_RE.replace_all(markup, "\n");
    let spaced = broken.replace("</span>", " ");
    let stripped = TAG_RE.replace_all(&spaced, "");
    let text = unescape_html(&stripped);

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_owned()
}
