//! Test utilities for Chatty
//!
//! Provides a scripted `Provider` so session and command tests run without
//! a network.

use crate::credential::Credential;
use crate::error::{ChattyError, Result};
use crate::providers::{check_preconditions, Provider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One scripted provider reply
#[derive(Debug)]
pub enum MockReply {
    /// Return this text as the answer
    Answer(String),
    /// Fail with this error
    Error(ChattyError),
}

/// Provider that replays scripted replies in order
///
/// Preconditions are checked like a real provider, so a missing credential
/// fails without consuming a reply. Once the script runs out every call
/// answers `"Done"`.
pub struct MockProvider {
    replies: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep this long before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts that reached the provider, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn send(&self, prompt: &str, credential: Option<&Credential>) -> Result<String> {
        check_preconditions(prompt, credential)?;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Answer(text)) => Ok(text),
            Some(MockReply::Error(err)) => Err(err.into()),
            None => Ok("Done".to_string()),
        }
    }

    fn model(&self) -> String {
        "mock-model".to_string()
    }
}

/// Assert that an `anyhow` error wraps the expected `ChattyError` variant
pub fn assert_chatty_error<T: std::fmt::Debug>(
    result: Result<T>,
    matches: impl Fn(&ChattyError) -> bool,
) {
    let err = result.expect_err("expected an error");
    let chatty = err
        .downcast_ref::<ChattyError>()
        .unwrap_or_else(|| panic!("expected ChattyError, got: {}", err));
    assert!(matches(chatty), "unexpected error variant: {:?}", chatty);
}
