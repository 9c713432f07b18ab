//! Conversation manager: history, the streaming session and every rule
//! around a submit.
//!
//! DESIGN
//! ======
//! One manager owns the whole widget state: the persisted history, at most
//! one [`StreamingSession`], the submit throttle, the active language, the
//! window visibility and the unread counter. Every mutation of history is
//! flushed to the store immediately.
//!
//! An exchange runs in phases that a front-end may also drive by hand:
//!
//! ```text
//! begin ──► apply_delta* ──► complete
//!   │                 └────► fail
//!   └─► Ignored / Throttled / Busy
//! ```
//!
//! `submit` composes them against a [`ChatTransport`]. The busy gate is the
//! `Option<StreamingSession>` itself; it is checked and set without an await
//! in between, so two exchanges can never overlap.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal. A rejected submit becomes an inline notice, a
//! transport failure replaces the placeholder with one localized error line,
//! and storage write failures are logged while the in-memory state carries
//! on. Every path ends back in `Idle`.

use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::i18n::{self, Key};
use crate::language::{self, Language};
use crate::markup::{MarkupFormatter, escape_html, render_plain};
use crate::persistence::{ConversationStore, ConversationTurn, Role, Visibility};
use crate::stream;
use crate::surface::{MessageNode, NodeId, RenderSurface, Sender, Suggestions};
use crate::throttle::SubmitThrottle;
use crate::transport::{ChatRequest, ChatTransport, TransportError};

// =============================================================================
// TYPES
// =============================================================================

/// Exchange phase. `Throttled` and `Error` are passed through on the way
/// back to the previous phase; only `Idle` and `Streaming` persist between
/// calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Throttled,
    Streaming,
    Error,
}

/// Result of one submit (or one phase of it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming.
    Ignored,
    /// Too soon after the previous accepted submit; `message` was shown.
    Throttled { message: &'static str },
    /// An exchange is already streaming.
    Busy,
    /// Stream ended. `reply` is `None` when it carried no visible text.
    Completed { reply: Option<String> },
    /// Transport failed; the localized error replaced the reply.
    Failed { error: String },
}

/// Outcome of [`ConversationManager::begin_at`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Begin {
    /// Session opened; send this request.
    Accepted(ChatRequest),
    Rejected(SubmitOutcome),
}

struct StreamingSession {
    buffer: String,
    node: NodeId,
    started: Instant,
    formatter: MarkupFormatter,
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct ConversationManager<R: RenderSurface> {
    store: ConversationStore,
    surface: R,
    transport: Arc<dyn ChatTransport>,
    history: Vec<ConversationTurn>,
    session: Option<StreamingSession>,
    phase: ExchangeState,
    throttle: SubmitThrottle,
    language: Language,
    visibility: Visibility,
    unread: u32,
    last_rendered: Option<String>,
    suggestions_enabled: bool,
}

impl<R: RenderSurface> ConversationManager<R> {
    #[must_use]
    pub fn new(store: ConversationStore, surface: R, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            store,
            surface,
            transport,
            history: Vec::new(),
            session: None,
            phase: ExchangeState::Idle,
            throttle: SubmitThrottle::default(),
            language: Language::default(),
            visibility: Visibility::default(),
            unread: 0,
            last_rendered: None,
            suggestions_enabled: true,
        }
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: SubmitThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    // -------------------------------------------------------------------------
    // accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.phase
    }

    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    #[must_use]
    pub fn surface(&self) -> &R {
        &self.surface
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub fn unread(&self) -> u32 {
        self.unread
    }

    /// Current quick-suggestion block.
    #[must_use]
    pub fn suggestions(&self) -> Suggestions {
        Suggestions {
            heading: i18n::text(self.language, Key::SuggestionsHeading),
            items: i18n::quick_suggestions(self.language),
            enabled: self.suggestions_enabled,
        }
    }

    /// Prompt text of quick suggestion `index` in the active language.
    #[must_use]
    pub fn suggestion(&self, index: usize) -> Option<&'static str> {
        i18n::quick_suggestions(self.language).get(index).copied()
    }

    // -------------------------------------------------------------------------
    // lifecycle
    // -------------------------------------------------------------------------

    /// Load persisted state and paint it: the welcome message when there is
    /// no history, otherwise a replay of every turn.
    pub fn restore(&mut self) {
        self.history = self.store.load_history();
        self.visibility = match self.store.load_visibility() {
            Some(visibility) => visibility,
            None => {
                self.persist_visibility(Visibility::Open);
                Visibility::Open
            }
        };
        self.unread = 0;
        self.surface.set_badge(0);

        if self.history.is_empty() {
            info!(visibility = self.visibility.as_str(), "conversation: fresh start");
            self.show_welcome();
        } else {
            info!(turns = self.history.len(), visibility = self.visibility.as_str(), "conversation: replaying history");
            let turns = self.history.clone();
            for turn in &turns {
                let markup = match turn.role {
                    Role::User => render_plain(&turn.content),
                    Role::Assistant => MarkupFormatter::new(language::detect(&turn.content)).render(&turn.content),
                };
                let sender = match turn.role {
                    Role::User => Sender::User,
                    Role::Assistant => Sender::Assistant,
                };
                self.paint(sender, &turn.content, markup);
            }
        }
        self.show_suggestions();
    }

    pub fn open(&mut self) {
        self.visibility = Visibility::Open;
        self.persist_visibility(Visibility::Open);
        self.unread = 0;
        self.surface.set_badge(0);
    }

    pub fn close(&mut self) {
        self.visibility = Visibility::Closed;
        self.persist_visibility(Visibility::Closed);
    }

    /// Flip visibility and return the new state.
    pub fn toggle(&mut self) -> Visibility {
        match self.visibility {
            Visibility::Open => self.close(),
            Visibility::Closed => self.open(),
        }
        self.visibility
    }

    /// Forget the conversation: history, persisted key, painted nodes and any
    /// in-flight session. The welcome message is shown again.
    pub fn clear_history(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(buffered = session.buffer.len(), "conversation: session dropped by clear");
            self.transition(ExchangeState::Idle);
        }
        self.history.clear();
        if let Err(e) = self.store.clear_history() {
            warn!(error = %e, "conversation: clearing persisted history failed");
        }
        self.surface.clear();
        self.last_rendered = None;
        self.suggestions_enabled = true;
        info!("conversation: history cleared");
        self.show_welcome();
        self.show_suggestions();
    }

    /// Manual language switch. Re-renders the quick suggestions.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.show_suggestions();
    }

    // -------------------------------------------------------------------------
    // exchange phases
    // -------------------------------------------------------------------------

    /// Admit a submit at `now`: throttle, busy gate, then record the user turn
    /// and open the streaming session.
    pub fn begin_at(&mut self, input: &str, now: Instant) -> Begin {
        let message = input.trim();
        if message.is_empty() {
            return Begin::Rejected(SubmitOutcome::Ignored);
        }

        if let Err(e) = self.throttle.check_at(now) {
            let resume = self.phase;
            self.transition(ExchangeState::Throttled);
            debug!(error = %e, "conversation: submit throttled");
            let notice = i18n::text(self.language, Key::ThrottleWait);
            let markup = format!("<div class=\"chat-notice\">{}</div>", escape_html(notice));
            self.paint(Sender::Notice, notice, markup);
            self.transition(resume);
            return Begin::Rejected(SubmitOutcome::Throttled { message: notice });
        }

        if self.session.is_some() {
            debug!(message_len = message.len(), "conversation: submit while streaming ignored");
            return Begin::Rejected(SubmitOutcome::Busy);
        }

        self.throttle.record_at(now);
        self.language = language::detect(message);
        self.history.push(ConversationTurn::user(message));
        self.persist_history();
        self.paint(Sender::User, message, render_plain(message));

        let node = self.surface.append(MessageNode::new(Sender::Assistant, "", ""));
        self.last_rendered = Some(String::new());
        self.suggestions_enabled = false;
        self.show_suggestions();
        self.session = Some(StreamingSession {
            buffer: String::new(),
            node,
            started: now,
            formatter: MarkupFormatter::new(self.language),
        });
        self.transition(ExchangeState::Streaming);
        info!(
            message_len = message.len(),
            language = %self.language,
            turns = self.history.len(),
            "conversation: submit accepted"
        );

        Begin::Accepted(ChatRequest {
            message: message.to_owned(),
            language: self.language,
            history: self.history.clone(),
        })
    }

    /// [`Self::begin_at`] with the current instant.
    pub fn begin(&mut self, input: &str) -> Begin {
        self.begin_at(input, Instant::now())
    }

    /// Append a delta to the session buffer and repaint the placeholder.
    /// Returns `false` when no session is streaming.
    pub fn apply_delta(&mut self, delta: &str) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!(delta_len = delta.len(), "conversation: delta without session dropped");
            return false;
        };
        session.buffer.push_str(delta);
        let markup = session.formatter.render(&session.buffer);
        self.surface.replace(session.node, &session.buffer, &markup);
        true
    }

    /// Close the session after the stream ended cleanly. A reply with visible
    /// text becomes an assistant turn; an empty one leaves history untouched.
    pub fn complete(&mut self) -> SubmitOutcome {
        let Some(session) = self.session.take() else {
            return SubmitOutcome::Completed { reply: None };
        };
        let elapsed_ms = u64::try_from(session.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let has_content = !session.buffer.trim().is_empty();
        let reply = if has_content {
            self.history.push(ConversationTurn::assistant(session.buffer.clone()));
            self.persist_history();
            self.last_rendered = Some(session.buffer.clone());
            Some(session.buffer)
        } else {
            None
        };
        info!(reply_len = reply.as_ref().map_or(0, String::len), elapsed_ms, "conversation: reply complete");
        self.finish_exchange(has_content);
        SubmitOutcome::Completed { reply }
    }

    /// Close the session after a transport failure. Partial text is
    /// discarded and the placeholder shows the localized error.
    pub fn fail(&mut self, error: &TransportError) -> SubmitOutcome {
        let Some(session) = self.session.take() else {
            return SubmitOutcome::Failed { error: error.to_string() };
        };
        self.transition(ExchangeState::Error);
        warn!(error = %error, discarded = session.buffer.len(), "conversation: exchange failed");
        let message = i18n::text(self.language, Key::StreamError);
        let markup = format!("<div class=\"chat-error\"><p>{}</p></div>", escape_html(message));
        self.surface.replace(session.node, message, &markup);
        self.last_rendered = Some(message.to_owned());
        self.finish_exchange(true);
        SubmitOutcome::Failed { error: error.to_string() }
    }

    /// Run one whole exchange: admit, open the transport, stream every delta
    /// into the placeholder, then complete or fail.
    pub async fn submit_at(&mut self, input: &str, now: Instant) -> SubmitOutcome {
        let request = match self.begin_at(input, now) {
            Begin::Accepted(request) => request,
            Begin::Rejected(outcome) => return outcome,
        };

        let transport = Arc::clone(&self.transport);
        let body = match transport.open(&request).await {
            Ok(body) => body,
            Err(e) => return self.fail(&e),
        };

        let mut deltas = pin!(stream::deltas(body));
        while let Some(item) = deltas.next().await {
            match item {
                Ok(delta) => {
                    self.apply_delta(&delta);
                }
                Err(e) => return self.fail(&e),
            }
        }
        self.complete()
    }

    /// [`Self::submit_at`] with the current instant.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        self.submit_at(input, Instant::now()).await
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    fn finish_exchange(&mut self, slot_has_content: bool) {
        if slot_has_content && self.visibility == Visibility::Closed {
            self.unread += 1;
            self.surface.set_badge(self.unread);
        }
        if !self.suggestions_enabled {
            self.suggestions_enabled = true;
            self.show_suggestions();
        }
        self.transition(ExchangeState::Idle);
    }

    /// Append a node unless its text repeats the last rendered message.
    fn paint(&mut self, sender: Sender, text: &str, markup: String) -> Option<NodeId> {
        if self.last_rendered.as_deref() == Some(text) {
            debug!(?sender, text_len = text.len(), "conversation: duplicate message suppressed");
            return None;
        }
        self.last_rendered = Some(text.to_owned());
        Some(self.surface.append(MessageNode::new(sender, text, markup)))
    }

    fn show_welcome(&mut self) {
        let welcome = i18n::text(self.language, Key::Welcome);
        let markup = MarkupFormatter::new(self.language).render(welcome);
        self.paint(Sender::Assistant, welcome, markup);
    }

    fn show_suggestions(&mut self) {
        let suggestions = self.suggestions();
        self.surface.show_suggestions(&suggestions);
    }

    fn persist_history(&self) {
        if let Err(e) = self.store.save_history(&self.history) {
            warn!(error = %e, turns = self.history.len(), "conversation: history write failed");
        }
    }

    fn persist_visibility(&self, visibility: Visibility) {
        if let Err(e) = self.store.save_visibility(visibility) {
            warn!(error = %e, "conversation: chat state write failed");
        }
    }

    fn transition(&mut self, to: ExchangeState) {
        debug!(from = ?self.phase, ?to, "conversation: state transition");
        self.phase = to;
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
