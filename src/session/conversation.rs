//! Conversation store
//!
//! Holds the append-only message log and the draft text for one session.
//! Every mutation records a [`SessionEvent`] so the view knows to redraw and
//! scroll to the latest message.

use std::fmt::{self, Write as _};

use chrono::Local;
use ulid::{Generator, Ulid};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Text typed by the user
    User,
    /// Text generated by the model
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Assistant => write!(f, "Gemini"),
        }
    }
}

/// One entry in the conversation
///
/// Messages are immutable once created; the store hands out shared
/// references only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: Ulid,
    text: String,
    sender: Sender,
    created_at: String,
}

impl Message {
    /// Unique id, ordered by creation within a session
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Literal content, never empty
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Author of the message
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Time label fixed when the message was created
    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Notification that the session changed and the view should update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A message was appended
    MessageAppended(Ulid),
    /// The view should scroll to the newest message
    ScrollToLatest,
    /// The draft was reset after a send was accepted
    DraftCleared,
    /// A request started or finished
    PendingChanged(bool),
    /// The error banner changed
    ErrorChanged(Option<String>),
}

/// Ordered, append-only message log plus the draft being composed
pub struct Conversation {
    messages: Vec<Message>,
    draft: String,
    ids: Generator,
    time_format: String,
    events: Vec<SessionEvent>,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("messages", &self.messages.len())
            .field("draft_len", &self.draft.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Conversation {
    /// Creates an empty conversation
    ///
    /// # Arguments
    ///
    /// * `time_format` - `chrono` format string for message time labels
    ///
    /// # Examples
    ///
    /// ```
    /// use chatty::session::{Conversation, Sender};
    ///
    /// let mut conversation = Conversation::new("%H:%M");
    /// conversation.append(Sender::User, "Hi");
    /// assert_eq!(conversation.len(), 1);
    /// assert!(conversation.append(Sender::Assistant, "").is_none());
    /// ```
    pub fn new(time_format: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            draft: String::new(),
            ids: Generator::new(),
            time_format: time_format.into(),
            events: Vec::new(),
        }
    }

    /// Append a message to the end of the log
    ///
    /// Returns `None` without touching the log when `text` is empty.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> Option<&Message> {
        let text = text.into();
        if text.is_empty() {
            tracing::warn!(?sender, "Refusing to append empty message");
            return None;
        }

        let id = self.ids.generate().unwrap_or_else(|_| Ulid::new());
        let message = Message {
            id,
            text,
            sender,
            created_at: self.time_label(),
        };

        self.messages.push(message);
        self.events.push(SessionEvent::MessageAppended(id));
        self.events.push(SessionEvent::ScrollToLatest);
        self.messages.last()
    }

    /// Replace the draft text
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Reset the draft to empty
    pub fn clear_draft(&mut self) {
        self.draft.clear();
        self.events.push(SessionEvent::DraftCleared);
    }

    /// Current draft text
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// All messages in creation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by id
    pub fn get(&self, id: Ulid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when no message has been stored
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Record a state change that did not come from the log itself
    pub(crate) fn notify(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all pending view events, oldest first
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn time_label(&self) -> String {
        let now = Local::now();
        let mut label = String::new();
        if write!(label, "{}", now.format(&self.time_format)).is_err() {
            label = now.format("%H:%M").to_string();
        }
        label
    }
}
