//! Provider module for Chatty
//!
//! This module contains the request dispatcher abstraction and the Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{check_preconditions, Provider};
pub use gemini::GeminiProvider;

use crate::config::GeminiConfig;
use crate::error::Result;

/// Create the provider described by configuration
///
/// # Errors
///
/// Returns error if provider initialization fails
pub fn create_provider(config: &GeminiConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(GeminiProvider::new(config.clone())?))
}
