//! Chat session
//!
//! This module contains the in-memory conversation store and the
//! controller that runs the submit state machine against a provider.

pub mod controller;
pub mod conversation;

pub use controller::{ChatSession, SessionState, SubmitOutcome};
pub use conversation::{Conversation, Message, Sender, SessionEvent};
