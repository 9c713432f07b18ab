//! Render surface: where the conversation manager paints messages.
//!
//! DESIGN
//! ======
//! The surface is append-only from the manager's point of view: a message is
//! appended once and afterwards only its content may be replaced (the
//! streaming placeholder). The manager keeps every piece of conversation
//! state; a surface holds nothing but what it was told to paint.
//!
//! [`MemorySurface`] keeps the painted nodes in memory. It backs the terminal
//! front-end and the tests.

use time::OffsetDateTime;

/// Who a rendered node speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
    /// Inline status line (throttle wait message and similar).
    Notice,
}

/// Handle to an appended node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// One painted message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageNode {
    pub sender: Sender,
    /// Source text the markup was rendered from.
    pub text: String,
    pub markup: String,
    pub timestamp: OffsetDateTime,
}

impl MessageNode {
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>, markup: impl Into<String>) -> Self {
        Self { sender, text: text.into(), markup: markup.into(), timestamp: OffsetDateTime::now_utc() }
    }
}

/// Quick-suggestion block shown under the welcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub heading: &'static str,
    pub items: &'static [&'static str],
    /// False while an exchange is in flight.
    pub enabled: bool,
}

pub trait RenderSurface {
    /// Paint a new node at the end of the message list.
    fn append(&mut self, node: MessageNode) -> NodeId;

    /// Swap the content of an existing node. Unknown ids are ignored.
    fn replace(&mut self, id: NodeId, text: &str, markup: &str);

    /// Remove every node.
    fn clear(&mut self);

    fn show_suggestions(&mut self, suggestions: &Suggestions);

    /// Unread badge; zero hides it.
    fn set_badge(&mut self, unread: u32);
}

// =============================================================================
// MEMORY SURFACE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: Vec<MessageNode>,
    suggestion_renders: Vec<Suggestions>,
    badge: u32,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nodes(&self) -> &[MessageNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MessageNode> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn last(&self) -> Option<&MessageNode> {
        self.nodes.last()
    }

    /// Suggestion block as last rendered.
    #[must_use]
    pub fn suggestions(&self) -> Option<&Suggestions> {
        self.suggestion_renders.last()
    }

    /// Every suggestion render, oldest first.
    #[must_use]
    pub fn suggestion_renders(&self) -> &[Suggestions] {
        &self.suggestion_renders
    }

    #[must_use]
    pub fn badge(&self) -> u32 {
        self.badge
    }
}

impl RenderSurface for MemorySurface {
    fn append(&mut self, node: MessageNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn replace(&mut self, id: NodeId, text: &str, markup: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            text.clone_into(&mut node.text);
            markup.clone_into(&mut node.markup);
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.suggestion_renders.clear();
    }

    fn show_suggestions(&mut self, suggestions: &Suggestions) {
        self.suggestion_renders.push(suggestions.clone());
    }

    fn set_badge(&mut self, unread: u32) {
        self.badge = unread;
    }
}

#[cfg(test)]
#[path = "surface_test.rs"]
mod tests;
