//! Chatty - terminal chat client library
//!
//! This library provides the pieces of a single-session chat client for the
//! Gemini generative-language API.
//!
//! # Architecture
//!
//! - `session`: conversation store and the submit state machine
//! - `providers`: request dispatcher trait and the Gemini implementation
//! - `render`: terminal rendering of the conversation view
//! - `credential`: runtime-only API key handling
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli` / `commands`: command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use chatty::{ChatSession, Config, Credential};
//! use chatty::providers::create_provider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider)?;
//!     let mut session = ChatSession::new(Credential::new("my-key"), &config);
//!     session.set_draft("Hello!");
//!     session.submit(provider.as_ref()).await;
//!     session.dispose();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod credential;
pub mod error;
pub mod providers;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use credential::Credential;
pub use error::{ChattyError, Result};
pub use session::{ChatSession, Message, Sender, SessionState, SubmitOutcome};

#[cfg(test)]
pub mod test_utils;
