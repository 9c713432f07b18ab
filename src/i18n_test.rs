use super::*;
use crate::language::detect;

const ALL_KEYS: [Key; 7] = [
    Key::Welcome,
    Key::SuggestionsHeading,
    Key::ThrottleWait,
    Key::StreamError,
    Key::TipLabel,
    Key::ClearConfirm,
    Key::InputPlaceholder,
];

#[test]
fn every_key_has_text_in_both_languages() {
    for key in ALL_KEYS {
        assert!(!text(Language::En, key).is_empty(), "{key:?} en");
        assert!(!text(Language::Hi, key).is_empty(), "{key:?} hi");
        assert_ne!(text(Language::En, key), text(Language::Hi, key), "{key:?}");
    }
}

#[test]
fn hindi_strings_are_detected_as_hindi() {
    for key in ALL_KEYS {
        assert_eq!(detect(text(Language::Hi, key)), Language::Hi, "{key:?}");
    }
}

#[test]
fn welcome_message_starts_with_bold_title() {
    assert!(text(Language::En, Key::Welcome).starts_with("**Welcome"));
    assert!(text(Language::Hi, Key::Welcome).starts_with("**"));
}

#[test]
fn five_quick_suggestions_per_language() {
    assert_eq!(quick_suggestions(Language::En).len(), 5);
    assert_eq!(quick_suggestions(Language::Hi).len(), 5);
    assert_eq!(quick_suggestions(Language::En)[2], "Pest control methods");
}
