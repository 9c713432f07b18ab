//! Localized widget strings.
//!
//! Every user-visible string the core produces goes through [`text`], keyed
//! by [`Key`] and the active [`Language`].

use crate::language::Language;

/// Identifier of a localized string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Greeting shown when there is no history to replay.
    Welcome,
    /// Heading above the quick-suggestion prompts.
    SuggestionsHeading,
    /// Inline notice for a submit rejected by the throttle.
    ThrottleWait,
    /// Inline error replacing a failed assistant reply.
    StreamError,
    /// Label of a tip callout block.
    TipLabel,
    /// Confirmation prompt before clearing history.
    ClearConfirm,
    /// Placeholder of the message input.
    InputPlaceholder,
}

/// Look up the string for `key` in `language`.
#[must_use]
pub fn text(language: Language, key: Key) -> &'static str {
    match (language, key) {
        (Language::En, Key::Welcome) => {
            "**Welcome to KrishiBot!** 🌱\n\n## How can I help you today?\n- ✨ Crop advice\n- ✨ Pest identification\n- 🌦️ Weather forecasts\n- 📜 Government schemes\n\nTip: You can ask in English or हिंदी!"
        }
        (Language::Hi, Key::Welcome) => {
            "**कृषि बॉट में आपका स्वागत है!** 🌱\n\n## मैं आपकी कैसे मदद कर सकता हूँ?\n- ✨ फसल सलाह\n- ✨ कीट पहचान\n- 🌦️ मौसम पूर्वानुमान\n- 📜 सरकारी योजनाएं\n\nटिप: आप अंग्रेजी या हिंदी में पूछ सकते हैं!"
        }
        (Language::En, Key::SuggestionsHeading) => "Try asking:",
        (Language::Hi, Key::SuggestionsHeading) => "इनमें से पूछें:",
        (Language::En, Key::ThrottleWait) => "Please wait a moment before sending another message",
        (Language::Hi, Key::ThrottleWait) => "कृपया अगला संदेश भेजने से पहले कुछ क्षण प्रतीक्षा करें",
        (Language::En, Key::StreamError) => "Sorry, we encountered an error. Please try again.",
        (Language::Hi, Key::StreamError) => "क्षमा करें, एक त्रुटि हुई। कृपया पुनः प्रयास करें।",
        (Language::En, Key::TipLabel) => "Tip",
        (Language::Hi, Key::TipLabel) => "सलाह",
        (Language::En, Key::ClearConfirm) => "Are you sure you want to clear the chat history?",
        (Language::Hi, Key::ClearConfirm) => "क्या आप वाकई चैट इतिहास साफ करना चाहते हैं?",
        (Language::En, Key::InputPlaceholder) => "Type your message...",
        (Language::Hi, Key::InputPlaceholder) => "अपना संदेश टाइप करें...",
    }
}

/// Quick-suggestion prompts offered under the latest assistant message.
#[must_use]
pub fn quick_suggestions(language: Language) -> &'static [&'static str] {
    match language {
        Language::En => &[
            "Best crops for red soil",
            "Government schemes for farmers",
            "Pest control methods",
            "Weather-based farming advice",
            "Organic farming techniques",
        ],
        Language::Hi => &[
            "लाल मिट्टी के लिए उपयुक्त फसलें",
            "किसानों के लिए सरकारी योजनाएं",
            "कीट नियंत्रण के तरीके",
            "मौसम आधारित कृषि सलाह",
            "जैविक खेती तकनीक",
        ],
    }
}

#[cfg(test)]
#[path = "i18n_test.rs"]
mod tests;
