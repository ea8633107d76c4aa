//! Session controller
//!
//! Owns the session state (conversation, pending flag, last error,
//! credential) and drives the submit state machine:
//!
//! - `Idle`/`IdleWithError` + valid submit -> `Sending`
//! - `Sending` + answer -> `Idle`
//! - `Sending` + failure -> `IdleWithError`
//!
//! Submitting while `Sending` or with a blank draft is a no-op. Dispatch
//! errors are recorded in `last_error` and never escape the controller.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::conversation::{Conversation, Message, Sender, SessionEvent};
use crate::config::Config;
use crate::credential::Credential;
use crate::error::{ChattyError, Result};
use crate::providers::Provider;

/// Where the submit state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for input
    Idle,
    /// A request is in flight
    Sending,
    /// Ready for input, the last request failed
    IdleWithError,
}

/// What a submit attempt led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened: blank draft, request already in flight, or session torn down
    Ignored,
    /// An assistant message was appended
    Answered,
    /// The request failed and the error banner was set
    Failed,
    /// The request was cancelled; no message and no error
    Cancelled,
}

/// One chat session, created when the view starts and disposed when it ends
///
/// # Examples
///
/// ```no_run
/// use chatty::config::Config;
/// use chatty::credential::Credential;
/// use chatty::providers::create_provider;
/// use chatty::session::ChatSession;
///
/// # async fn example() -> chatty::error::Result<()> {
/// let config = Config::default();
/// let provider = create_provider(&config.provider)?;
/// let mut session = ChatSession::new(Credential::new("my-key"), &config);
///
/// session.set_draft("Hi");
/// session.submit(provider.as_ref()).await;
/// for message in session.messages() {
///     println!("{}: {}", message.sender(), message.text());
/// }
/// session.dispose();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChatSession {
    conversation: Conversation,
    pending: bool,
    last_error: Option<String>,
    credential: Option<Credential>,
    timeout: Duration,
    teardown: CancellationToken,
}

impl ChatSession {
    /// Creates an empty session
    pub fn new(credential: Option<Credential>, config: &Config) -> Self {
        debug!(
            has_credential = credential.is_some(),
            "Creating chat session"
        );
        Self {
            conversation: Conversation::new(config.chat.time_format.clone()),
            pending: false,
            last_error: None,
            credential,
            timeout: config.provider.timeout(),
            teardown: CancellationToken::new(),
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current state of the submit state machine
    pub fn state(&self) -> SessionState {
        if self.pending {
            SessionState::Sending
        } else if self.last_error.is_some() {
            SessionState::IdleWithError
        } else {
            SessionState::Idle
        }
    }

    /// True exactly while a request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// User-facing message of the most recent failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Messages in creation order
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// The underlying conversation store
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Text currently being composed
    pub fn draft(&self) -> &str {
        self.conversation.draft()
    }

    /// Replace the text being composed
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.conversation.set_draft(text);
    }

    /// Whether a credential is available for the next request
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Supply or replace the credential for subsequent requests
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        info!(
            has_credential = credential.is_some(),
            "Session credential updated"
        );
        self.credential = credential;
    }

    /// Take pending view events, oldest first
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.conversation.drain_events()
    }

    /// Token that tears the session down when cancelled
    ///
    /// Cancelling it aborts any request in flight and makes further submits
    /// no-ops.
    pub fn teardown_handle(&self) -> CancellationToken {
        self.teardown.clone()
    }

    /// Accept the draft for sending
    ///
    /// On success the user message has been appended, the draft and the
    /// error are cleared, the session is `Sending`, and the prompt to
    /// dispatch is returned. Returns `None` (and changes nothing) when a
    /// request is already in flight, the draft is blank, or the session was
    /// torn down.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.pending {
            debug!("Submit ignored: request already in flight");
            return None;
        }
        if self.teardown.is_cancelled() {
            debug!("Submit ignored: session torn down");
            return None;
        }
        if self.conversation.draft().trim().is_empty() {
            return None;
        }

        let prompt = self.conversation.draft().to_string();
        self.conversation.append(Sender::User, prompt.clone());
        self.conversation.clear_draft();

        if self.last_error.take().is_some() {
            self.conversation.notify(SessionEvent::ErrorChanged(None));
        }

        self.pending = true;
        self.conversation.notify(SessionEvent::PendingChanged(true));
        Some(prompt)
    }

    /// Run one accepted prompt through the provider
    ///
    /// The call is bounded by the session timeout and aborted when either
    /// the session is torn down or `interrupt` resolves.
    pub async fn dispatch<F>(&self, provider: &dyn Provider, prompt: &str, interrupt: F) -> Result<String>
    where
        F: Future<Output = ()>,
    {
        let request = tokio::time::timeout(
            self.timeout,
            provider.send(prompt, self.credential.as_ref()),
        );

        tokio::select! {
            _ = self.teardown.cancelled() => Err(ChattyError::Cancelled.into()),
            _ = interrupt => Err(ChattyError::Cancelled.into()),
            result = request => match result {
                Ok(answer) => answer,
                Err(_) => Err(ChattyError::Network(format!(
                    "request timed out after {} seconds",
                    self.timeout.as_secs_f32()
                ))
                .into()),
            },
        }
    }

    /// Apply the result of a dispatched prompt
    pub fn finish_submit(&mut self, result: Result<String>) -> SubmitOutcome {
        match result {
            Ok(answer) => self.finish_with_answer(answer),
            Err(err) => self.finish_with_error(&err),
        }
    }

    fn end_pending(&mut self) -> bool {
        if !self.pending {
            warn!("finish_submit called with no request in flight");
            return false;
        }
        self.pending = false;
        self.conversation.notify(SessionEvent::PendingChanged(false));
        true
    }

    fn finish_with_answer(&mut self, answer: String) -> SubmitOutcome {
        if !self.end_pending() {
            return SubmitOutcome::Ignored;
        }
        if self.conversation.append(Sender::Assistant, answer).is_some() {
            debug!(messages = self.conversation.len(), "Assistant answered");
            SubmitOutcome::Answered
        } else {
            self.record_error(empty_answer().to_string());
            SubmitOutcome::Failed
        }
    }

    fn finish_with_error(&mut self, err: &anyhow::Error) -> SubmitOutcome {
        if !self.end_pending() {
            return SubmitOutcome::Ignored;
        }
        if matches!(err.downcast_ref::<ChattyError>(), Some(ChattyError::Cancelled)) {
            info!("Request cancelled");
            return SubmitOutcome::Cancelled;
        }
        warn!("Request failed: {}", err);
        self.record_error(err.to_string());
        SubmitOutcome::Failed
    }

    /// Submit the draft and return the answer text
    ///
    /// The session is updated exactly as by [`ChatSession::submit`]; the
    /// failure is also handed back unchanged so callers can inspect its
    /// `ChattyError` variant.
    ///
    /// # Errors
    ///
    /// `EmptyPrompt` when the submit was ignored, `Cancelled` when
    /// `interrupt` or teardown won, otherwise the provider's error.
    pub async fn submit_for_answer<F>(
        &mut self,
        provider: &dyn Provider,
        interrupt: F,
    ) -> Result<String>
    where
        F: Future<Output = ()>,
    {
        let Some(prompt) = self.begin_submit() else {
            return Err(ChattyError::EmptyPrompt.into());
        };
        match self.dispatch(provider, &prompt, interrupt).await {
            Ok(answer) => match self.finish_with_answer(answer) {
                SubmitOutcome::Answered => self
                    .messages()
                    .last()
                    .map(|m| m.text().to_string())
                    .ok_or_else(|| empty_answer().into()),
                _ => Err(empty_answer().into()),
            },
            Err(err) => {
                self.finish_with_error(&err);
                Err(err)
            }
        }
    }

    /// Submit the draft and wait for the answer
    pub async fn submit(&mut self, provider: &dyn Provider) -> SubmitOutcome {
        self.submit_with_interrupt(provider, std::future::pending())
            .await
    }

    /// Submit the draft, aborting the request if `interrupt` resolves first
    pub async fn submit_with_interrupt<F>(
        &mut self,
        provider: &dyn Provider,
        interrupt: F,
    ) -> SubmitOutcome
    where
        F: Future<Output = ()>,
    {
        let Some(prompt) = self.begin_submit() else {
            return SubmitOutcome::Ignored;
        };
        let result = self.dispatch(provider, &prompt, interrupt).await;
        self.finish_submit(result)
    }

    /// Tear the session down, cancelling any request in flight
    pub fn dispose(self) {
        debug!(messages = self.conversation.len(), "Disposing chat session");
        self.teardown.cancel();
    }

    fn record_error(&mut self, message: String) {
        self.last_error = Some(message.clone());
        self.conversation
            .notify(SessionEvent::ErrorChanged(Some(message)));
    }
}

fn empty_answer() -> ChattyError {
    ChattyError::MalformedResponse("answer was empty".to_string())
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}
