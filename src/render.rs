//! Terminal rendering of the conversation view
//!
//! Every function here is a pure function of session data to a string; the
//! interactive loop decides when to print.

use colored::Colorize;

use crate::session::{ChatSession, Message, Sender};

/// Snapshot of everything the view draws
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub messages: &'a [Message],
    pub pending: bool,
    pub error: Option<&'a str>,
}

impl<'a> ViewModel<'a> {
    /// Capture the current view state of a session
    pub fn of(session: &'a ChatSession) -> Self {
        Self {
            messages: session.messages(),
            pending: session.is_pending(),
            error: session.last_error(),
        }
    }
}

/// Greeting shown before the first message
pub fn render_welcome(model: &str, has_credential: bool) -> String {
    let mut out = format!(
        "{}\n{}\n",
        "Welcome to Chatty AI".bold(),
        "Send a message to start the conversation".dimmed()
    );
    out.push_str(&format!("Model: {}\n", model.cyan()));
    if !has_credential {
        out.push_str(&format!(
            "{}\n",
            "No API key set. Use /key <value> or set GEMINI_API_KEY.".yellow()
        ));
    }
    out.push_str(&format!("{}\n", "Type /help for commands.".dimmed()));
    out
}

/// One message bubble: a header line then the text, indented
///
/// # Examples
///
/// ```
/// use chatty::render::render_message;
/// use chatty::session::{Conversation, Sender};
///
/// let mut conversation = Conversation::new("%H:%M");
/// let message = conversation.append(Sender::User, "Hi").unwrap();
/// assert!(render_message(message).contains("Hi"));
/// ```
pub fn render_message(message: &Message) -> String {
    let name = match message.sender() {
        Sender::User => message.sender().to_string().cyan().bold(),
        Sender::Assistant => message.sender().to_string().magenta().bold(),
    };
    let mut out = format!("{} {}\n", name, message.created_at().dimmed());
    for line in message.text().lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Indicator shown while a request is in flight
pub fn render_pending() -> String {
    format!(
        "{} {}\n",
        "...".magenta(),
        "waiting for Gemini (Ctrl-C to cancel)".dimmed()
    )
}

/// Banner for the most recent error
pub fn render_error_banner(error: &str) -> String {
    format!("{} {}\n", "!".red().bold(), error.red())
}

/// Full view: banner, messages (or the empty-state hint), pending indicator
pub fn render_view(view: &ViewModel<'_>) -> String {
    let mut out = String::new();

    if let Some(error) = view.error {
        out.push_str(&render_error_banner(error));
    }

    if view.messages.is_empty() {
        out.push_str(&format!(
            "{}\n",
            "No messages yet. Send a message to start the conversation".dimmed()
        ));
    }

    for message in view.messages {
        out.push_str(&render_message(message));
    }

    if view.pending {
        out.push_str(&render_pending());
    }

    out
}

/// Input prompt, reflecting whether sending is currently possible
pub fn render_prompt(view: &ViewModel<'_>) -> String {
    if view.pending {
        format!("{} ", "(sending)".dimmed())
    } else if view.error.is_some() {
        format!("{} ", ">".red())
    } else {
        format!("{} ", ">".green())
    }
}
