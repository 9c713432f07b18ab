use super::*;

#[test]
fn detect_devanagari_sentence_is_hindi() {
    assert_eq!(detect("मेरी फसल में कीड़े हैं"), Language::Hi);
}

#[test]
fn detect_latin_text_is_english() {
    assert_eq!(detect("pest control"), Language::En);
}

#[test]
fn detect_single_devanagari_code_point_in_mixed_text_is_hindi() {
    assert_eq!(detect("best fertilizer for गेहूं please"), Language::Hi);
    assert_eq!(detect("wheat \u{0900}"), Language::Hi);
    assert_eq!(detect("\u{097F} at the end"), Language::Hi);
}

#[test]
fn detect_empty_text_is_english() {
    assert_eq!(detect(""), Language::En);
}

#[test]
fn detect_code_points_just_outside_block_are_english() {
    // U+08FF (Arabic) and U+0980 (Bengali) border the Devanagari block.
    assert_eq!(detect("\u{08FF}\u{0980}"), Language::En);
}

#[test]
fn language_serializes_as_lowercase_tag() {
    assert_eq!(serde_json::to_string(&Language::En).unwrap(), "\"en\"");
    assert_eq!(serde_json::to_string(&Language::Hi).unwrap(), "\"hi\"");
    let parsed: Language = serde_json::from_str("\"hi\"").unwrap();
    assert_eq!(parsed, Language::Hi);
}

#[test]
fn from_tag_accepts_known_tags_only() {
    assert_eq!(Language::from_tag("EN"), Some(Language::En));
    assert_eq!(Language::from_tag(" hi "), Some(Language::Hi));
    assert_eq!(Language::from_tag("fr"), None);
}

#[test]
fn display_matches_wire_tag() {
    assert_eq!(Language::Hi.to_string(), "hi");
    assert_eq!(Language::default(), Language::En);
}
