//! Language detection for user input.
//!
//! DESIGN
//! ======
//! The widget speaks English and Hindi. A single Devanagari code point
//! anywhere in the input selects Hindi; everything else is English. There is
//! no scoring and no minimum ratio, so mixed-script input always resolves to
//! Hindi.

use serde::{Deserialize, Serialize};

/// First and last code points of the Devanagari Unicode block.
const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Language tag sent to the backend and used for every localized string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Wire tag, `"en"` or `"hi"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    /// Parse a wire tag. Unknown tags yield `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `text` as Hindi when it contains any Devanagari code point.
#[must_use]
pub fn detect(text: &str) -> Language {
    if text.chars().any(|c| DEVANAGARI.contains(&c)) {
        Language::Hi
    } else {
        Language::En
    }
}

#[cfg(test)]
#[path = "language_test.rs"]
mod tests;
