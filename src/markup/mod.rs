//! Markup formatter for assistant replies.
//!
//! DESIGN
//! ======
//! `render` is a pure function of the formatter and the cumulative reply
//! text. It runs on every streamed delta, so it never assumes the text is
//! complete: a construct that is only half-received renders as literal text
//! and is upgraded once the rest arrives. Each render replaces the previous
//! one wholesale, which keeps the output balanced for every prefix.
//!
//! The title stamp is fixed when the formatter is created. A streaming
//! session owns one formatter, so the synthesized title does not change
//! between renders of the same reply.

pub mod escape;
pub mod stages;

use time::OffsetDateTime;

use crate::language::Language;

pub use escape::{escape_html, to_plain_text};

/// Per-reply formatter: target language for localized labels and the
/// `HH:MM` stamp used in the synthesized title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFormatter {
    language: Language,
    stamp: String,
}

impl MarkupFormatter {
    /// Formatter stamped with the current local wall-clock time (UTC when the
    /// local offset is unavailable).
    #[must_use]
    pub fn new(language: Language) -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::with_stamp(language, &format!("{:02}:{:02}", now.hour(), now.minute()))
    }

    #[must_use]
    pub fn with_stamp(language: Language, stamp: &str) -> Self {
        Self { language, stamp: escape_html(stamp) }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Render possibly-incomplete reply text into `<div class="chat-response">`
    /// markup.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let text = escape_html(text);
        let text = stages::synthesize_title(&text, &self.stamp);
        let text = stages::promote_title(&text);
        let text = stages::promote_headings(&text);
        let text = stages::promote_list_items(&text);
        let text = stages::promote_tips(&text, self.language);
        let text = stages::wrap_lists(&text);
        let text = stages::promote_dividers(&text);
        let text = stages::apply_emphasis(&text);
        let body = stages::build_paragraphs(&text);
        format!("<div class=\"chat-response\">{body}</div>")
    }
}

/// Render a user message: escaped, newlines as `<br>`, no formatting.
#[must_use]
pub fn render_plain(text: &str) -> String {
    escape_html(text.trim()).replace('\n', "<br>")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
