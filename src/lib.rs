//! Streaming chat widget core: SSE delta decoding, incremental markup
//! rendering and the conversation state machine around them.

pub mod config;
pub mod conversation;
pub mod i18n;
pub mod language;
pub mod markup;
pub mod persistence;
pub mod stream;
pub mod surface;
pub mod throttle;
pub mod transport;
