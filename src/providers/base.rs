//! Base provider trait for Chatty
//!
//! This module defines the `Provider` trait that request dispatchers
//! implement, along with the precondition check they share.

use crate::credential::Credential;
use crate::error::{ChattyError, Result};
use async_trait::async_trait;

/// Provider trait for generative-text backends
///
/// A provider is a stateless function of its inputs: it holds no
/// conversation state between calls and sends exactly one prompt per call.
///
/// # Examples
///
/// ```no_run
/// use chatty::credential::Credential;
/// use chatty::error::Result;
/// use chatty::providers::Provider;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn send(&self, prompt: &str, _credential: Option<&Credential>) -> Result<String> {
///         Ok(prompt.to_string())
///     }
///
///     fn model(&self) -> String {
///         "echo".to_string()
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send one prompt and return the generated answer verbatim
    ///
    /// # Errors
    ///
    /// Returns a `ChattyError` (wrapped in `anyhow::Error`):
    /// `MissingCredential` or `EmptyPrompt` before any network call,
    /// `Http`, `MalformedResponse` or `Network` after it.
    async fn send(&self, prompt: &str, credential: Option<&Credential>) -> Result<String>;

    /// Name of the model requests are sent to
    fn model(&self) -> String;
}

/// Validate the inputs of a `send` call before touching the network
///
/// The credential is checked first so a missing key is reported even when
/// the prompt is also blank.
pub fn check_preconditions<'a>(
    prompt: &str,
    credential: Option<&'a Credential>,
) -> std::result::Result<&'a Credential, ChattyError> {
    let credential = credential.ok_or(ChattyError::MissingCredential)?;
    if prompt.trim().is_empty() {
        return Err(ChattyError::EmptyPrompt);
    }
    Ok(credential)
}
