//! Ordered grammar rules of the markup pipeline.
//!
//! GRAMMAR
//! =======
//! Every stage is a pure rewrite over HTML-escaped text and works line by
//! line. Block markup emitted by a stage always fits on one line and starts
//! with one of [`BLOCK_TAGS`]; later stages leave such lines alone, which is
//! what keeps a rule from re-matching an earlier rule's output. Anything a
//! rule does not recognize (including a half-streamed construct) passes
//! through as literal text.
//!
//! 1. title      `**Title (time)**` on the first line, synthesized if absent
//! 2. headings   `## x`, a wholly bold line, or a short keyword/emoji line
//! 3. list items `N. **label** *desc*` and `- ✨ **label** *desc*`
//! 4. tips       `Tip: body` and its variants
//! 5. lists      runs of items wrapped in `<ul>` / `<ol>`
//! 6. dividers   `---`
//! 7. emphasis   `**b**`, `*i*`, then paragraphs and line breaks

use std::sync::LazyLock;

use regex::Regex;

use crate::i18n::{self, Key};
use crate::language::Language;

/// Line prefixes of block markup emitted by the stages.
pub const BLOCK_TAGS: [&str; 7] = ["<h2", "<h3", "<li", "<ul", "<ol", "<div", "<hr"];

/// Longest line the keyword heuristic will promote to a heading.
pub const MAX_HEADING_CHARS: usize = 80;

const DEFAULT_SECTION_ICON: &str = "ℹ️";

const SECTION_ICONS: [(&[&str], &str); 7] = [
    (&["pest", "insect", "कीट"], "🐛"),
    (&["weather", "rain", "मौसम", "बारिश"], "⛅"),
    (&["soil", "land", "मिट्टी"], "🌱"),
    (&["water", "irrigation", "पानी", "सिंचाई"], "💧"),
    (&["scheme", "government", "योजना", "सरकार"], "🏛️"),
    (&["organic", "natural", "जैविक"], "🌿"),
    (&["yield", "production", "उपज", "उत्पादन"], "📈"),
];

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(.+?)\s*\(([^()]*)\)\*\*\s*$").expect("TITLE_RE regex pattern is valid"));
static MD_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("MD_HEADING_RE regex pattern is valid"));
static BOLD_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+)\*\*\s*:?$").expect("BOLD_LINE_RE regex pattern is valid"));
static LIST_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[.)]|[-+•]|\*\s)").expect("LIST_LIKE_RE regex pattern is valid"));
static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:pest|soil|water|scheme|management|control|technique|irrigation|fertili[sz]er)|कीट|मिट्टी|पानी|सिंचाई|योजना")
        .expect("KEYWORD_RE regex pattern is valid")
});
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)[.)]\s*(.*)$").expect("NUMBERED_RE regex pattern is valid"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-+•]\s*|\*\s+)(.*)$").expect("BULLET_RE regex pattern is valid"));
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+?)\*\*\s*:?\s*(.*)$").expect("LABEL_RE regex pattern is valid"));
static DESC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*]+)\*\s*(.*)$").expect("DESC_RE regex pattern is valid"));
static DESC_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*]+)\*$").expect("DESC_LINE_RE regex pattern is valid"));
static TIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:💡\s*)?(?:pro tip|regional tip|additional tip|tip|विशेषज्ञ सलाह|टिप|सलाह)\s*[:：]\s*(.*)$")
        .expect("TIP_RE regex pattern is valid")
});
static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-{3,}|_{3,})\s*$").expect("DIVIDER_RE regex pattern is valid"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE regex pattern is valid"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+?)\*\*").expect("BOLD_RE regex pattern is valid"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+?)\*").expect("ITALIC_RE regex pattern is valid"));

// =============================================================================
// HELPERS
// =============================================================================

/// True if `line` is block markup produced by a stage.
#[must_use]
pub fn is_block(line: &str) -> bool {
    let line = line.trim_start();
    BLOCK_TAGS.iter().any(|tag| line.starts_with(tag))
}

fn map_lines(text: &str, f: impl Fn(&str) -> Option<String>) -> String {
    text.split('\n')
        .map(|line| {
            if is_block(line) {
                return line.to_owned();
            }
            f(line).unwrap_or_else(|| line.to_owned())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2300..=0x23FF
            | 0x2B00..=0x2BFF
            | 0x2139
            | 0x203C
            | 0x2049
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

/// Split a leading emoji (with variation selectors, skin tones and ZWJ
/// joins) off `s`.
#[must_use]
pub fn split_leading_emoji(s: &str) -> Option<(&str, &str)> {
    let mut chars = s.char_indices();
    let (_, first) = chars.next()?;
    if !is_emoji(first) {
        return None;
    }
    let mut end = first.len_utf8();
    let mut joined = false;
    for (idx, c) in chars {
        let modifier = matches!(c, '\u{FE0E}' | '\u{FE0F}') || ('\u{1F3FB}'..='\u{1F3FF}').contains(&c);
        if modifier || c == '\u{200D}' || (joined && is_emoji(c)) {
            end = idx + c.len_utf8();
            joined = c == '\u{200D}';
        } else {
            break;
        }
    }
    Some((&s[..end], &s[end..]))
}

/// Icon for a section title, picked by keyword.
#[must_use]
pub fn section_icon(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    SECTION_ICONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(DEFAULT_SECTION_ICON, |(_, icon)| *icon)
}

// =============================================================================
// 1. TITLE
// =============================================================================

/// Prepend `**<first line> (<stamp>)**` unless the text already opens with a
/// bold segment. Text whose first line has no visible content is returned
/// unchanged.
#[must_use]
pub fn synthesize_title(text: &str, stamp: &str) -> String {
    let body = text.trim_start();
    if body.starts_with("**") {
        return text.to_owned();
    }
    let first_line = body.split('\n').next().unwrap_or_default();
    let title = first_line.trim().trim_start_matches('#').replace('*', "");
    let title = title.trim();
    if title.is_empty() {
        return text.to_owned();
    }
    format!("**{title} ({stamp})**\n\n{text}")
}

/// Promote a first line of the form `**Title (time)**` to the response title.
#[must_use]
pub fn promote_title(text: &str) -> String {
    let (first, rest) = text.split_once('\n').map_or((text, None), |(a, b)| (a, Some(b)));
    let Some(caps) = TITLE_RE.captures(first.trim()) else {
        return text.to_owned();
    };
    let heading = format!(
        "<h2 class=\"response-title\">{}<span class=\"response-time\">{}</span></h2>",
        caps[1].trim(),
        caps[2].trim()
    );
    match rest {
        Some(rest) => format!("{heading}\n{rest}"),
        None => heading,
    }
}

// =============================================================================
// 2. HEADINGS
// =============================================================================

/// Promote heading-like lines to section headings with a leading icon.
#[must_use]
pub fn promote_headings(text: &str) -> String {
    map_lines(text, promote_heading_line)
}

fn promote_heading_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(caps) = MD_HEADING_RE.captures(trimmed) {
        return Some(heading_markup(&caps[1]));
    }
    if let Some(caps) = BOLD_LINE_RE.captures(trimmed) {
        return Some(heading_markup(&caps[1]));
    }
    if looks_like_section(trimmed) {
        return Some(heading_markup(trimmed));
    }
    None
}

fn looks_like_section(line: &str) -> bool {
    if LIST_LIKE_RE.is_match(line) || TIP_RE.is_match(line) {
        return false;
    }
    if line.chars().count() > MAX_HEADING_CHARS || line.ends_with(['.', '।', ',', ';']) {
        return false;
    }
    split_leading_emoji(line).is_some() || KEYWORD_RE.is_match(line)
}

fn heading_markup(content: &str) -> String {
    let content = content.trim().trim_end_matches(':').trim_end();
    let (icon, title) = match split_leading_emoji(content) {
        Some((emoji, rest)) if !rest.trim().is_empty() => (emoji, rest.trim()),
        _ => (section_icon(content), content),
    };
    format!(
        "<h3 class=\"section-heading\"><span class=\"section-icon\">{icon}</span><span class=\"section-title\">{title}</span></h3>"
    )
}

// =============================================================================
// 3. LIST ITEMS
// =============================================================================

enum Marker<'a> {
    Number(&'a str),
    Bullet(&'a str),
}

/// Promote enumerated and bulleted `**label** *description*` lines to list
/// items. A description on the line right after the label is pulled in.
#[must_use]
pub fn promote_list_items(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let next = lines.get(i + 1).copied();
        if let Some((markup, consumed_next)) = list_item(lines[i], next) {
            out.push(markup);
            i += if consumed_next { 2 } else { 1 };
        } else {
            out.push(lines[i].to_owned());
            i += 1;
        }
    }
    out.join("\n")
}

fn list_item(line: &str, next: Option<&str>) -> Option<(String, bool)> {
    if is_block(line) {
        return None;
    }
    let (marker, rest) = if let Some(caps) = NUMBERED_RE.captures(line) {
        (Marker::Number(caps.get(1)?.as_str()), caps.get(2)?.as_str())
    } else if let Some(caps) = BULLET_RE.captures(line) {
        let rest = caps.get(1)?.as_str();
        match split_leading_emoji(rest) {
            Some((emoji, after)) => (Marker::Bullet(emoji), after.trim_start()),
            None => (Marker::Bullet("•"), rest),
        }
    } else {
        return None;
    };

    let caps = LABEL_RE.captures(rest)?;
    let label = caps.get(1)?.as_str().trim();
    let after_label = caps.get(2).map_or("", |m| m.as_str()).trim();

    let mut consumed_next = false;
    let (description, extra) = if let Some(desc) = DESC_RE.captures(after_label) {
        (Some(desc.get(1)?.as_str().trim()), desc.get(2).map_or("", |m| m.as_str()).trim())
    } else if after_label.is_empty() {
        let next_desc = next
            .map(str::trim)
            .and_then(|n| DESC_LINE_RE.captures(n))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        consumed_next = next_desc.is_some();
        (next_desc, "")
    } else {
        (None, after_label)
    };

    let mut body = format!("<span class=\"item-label\">{label}</span>");
    if let Some(description) = description {
        body.push_str(&format!("<p class=\"item-description\">{description}</p>"));
    }
    if !extra.is_empty() {
        body.push_str(&format!("<span class=\"item-extra\">{extra}</span>"));
    }

    let markup = match marker {
        Marker::Number(n) => format!(
            "<li class=\"numbered-item\" value=\"{n}\"><span class=\"item-number\">{n}.</span><div class=\"item-body\">{body}</div></li>"
        ),
        Marker::Bullet(icon) => format!(
            "<li class=\"bullet-item\"><span class=\"item-marker\">{icon}</span><div class=\"item-body\">{body}</div></li>"
        ),
    };
    Some((markup, consumed_next))
}

// =============================================================================
// 4. TIPS
// =============================================================================

/// Promote `Tip: ...` lines (and their variants) to a callout whose label is
/// localized to `language`.
#[must_use]
pub fn promote_tips(text: &str, language: Language) -> String {
    let label = i18n::text(language, Key::TipLabel);
    map_lines(text, |line| {
        let caps = TIP_RE.captures(line)?;
        Some(format!(
            "<div class=\"tip-callout\"><span class=\"tip-icon\">💡</span><div class=\"tip-body\"><p class=\"tip-label\">{label}</p><p class=\"tip-text\">{}</p></div></div>",
            caps[1].trim()
        ))
    })
}

// =============================================================================
// 5. LIST WRAPPING
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

fn list_kind(line: &str) -> Option<ListKind> {
    if line.starts_with("<li class=\"bullet-item\"") {
        Some(ListKind::Bullet)
    } else if line.starts_with("<li class=\"numbered-item\"") {
        Some(ListKind::Numbered)
    } else {
        None
    }
}

/// Wrap runs of list items of the same kind in a list container. Blank lines
/// between two items of the same kind do not break the run.
#[must_use]
pub fn wrap_lists(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let Some(kind) = list_kind(lines[i]) else {
            out.push(lines[i].to_owned());
            i += 1;
            continue;
        };
        let mut items = String::from(lines[i]);
        let mut end = i + 1;
        loop {
            let mut probe = end;
            while probe < lines.len() && lines[probe].trim().is_empty() {
                probe += 1;
            }
            if probe < lines.len() && list_kind(lines[probe]) == Some(kind) {
                items.push_str(lines[probe]);
                end = probe + 1;
            } else {
                break;
            }
        }
        let tag = match kind {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        };
        out.push(format!("<{tag} class=\"response-list\">{items}</{tag}>"));
        i = end;
    }
    out.join("\n")
}

// =============================================================================
// 6. DIVIDERS
// =============================================================================

/// Turn `---` (or `___`) lines into a divider.
#[must_use]
pub fn promote_dividers(text: &str) -> String {
    map_lines(text, |line| DIVIDER_RE.is_match(line).then(|| "<hr class=\"divider\">".to_owned()))
}

// =============================================================================
// 7. EMPHASIS AND PARAGRAPHS
// =============================================================================

/// Convert `**bold**` and `*italic*` inside text runs. Markup tags are never
/// part of a match, so emphasis cannot straddle an element boundary.
#[must_use]
pub fn apply_emphasis(text: &str) -> String {
    text.split('\n').map(emphasize_line).collect::<Vec<_>>().join("\n")
}

fn emphasize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for tag in TAG_RE.find_iter(line) {
        out.push_str(&emphasize_segment(&line[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&emphasize_segment(&line[last..]));
    out
}

fn emphasize_segment(segment: &str) -> String {
    if !segment.contains('*') {
        return segment.to_owned();
    }
    let bold = BOLD_RE.replace_all(segment, "<strong>${1}</strong>");
    ITALIC_RE.replace_all(&bold, "<em>${1}</em>").into_owned()
}

/// Group blank-line separated blocks into paragraphs. Consecutive text lines
/// are joined with `<br>`; block markup is never wrapped in a `<br>`.
#[must_use]
pub fn build_paragraphs(text: &str) -> String {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks.iter().map(|lines| paragraph(lines)).collect()
}

fn paragraph(lines: &[&str]) -> String {
    if let [only] = lines {
        if is_block(only) {
            return (*only).to_owned();
        }
    }
    let mut body = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 && !is_block(lines[idx - 1]) && !is_block(line) {
            body.push_str("<br>");
        }
        body.push_str(line);
    }
    format!("<div class=\"paragraph\">{body}</div>")
}

#[cfg(test)]
#[path = "stages_test.rs"]
mod tests;
