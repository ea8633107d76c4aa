//! API credential handling
//!
//! The credential is supplied at runtime and lives only in memory. It is
//! never serialized, never displayed, and its `Debug` output is redacted so it
//! cannot leak through tracing fields or panic messages.

use crate::config::CredentialConfig;
use crate::error::{ChattyError, Result};

/// Opaque bearer key used to authorize generative-text requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw key, rejecting blank input
    ///
    /// # Examples
    ///
    /// ```
    /// use chatty::credential::Credential;
    ///
    /// assert!(Credential::new("abc123").is_some());
    /// assert!(Credential::new("   ").is_none());
    /// ```
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw key for placing on the outbound request
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Resolve the credential for a new session
///
/// An explicit key (from `--api-key` or `GEMINI_API_KEY`) wins. Otherwise the
/// OS keyring is consulted when enabled in configuration. A keyring that is
/// unavailable or has no entry yields `Ok(None)`; the user can still supply a
/// key interactively.
pub fn resolve(explicit: Option<&str>, config: &CredentialConfig) -> Result<Option<Credential>> {
    if let Some(credential) = explicit.and_then(Credential::new) {
        tracing::debug!("Using API key supplied on the command line or environment");
        return Ok(Some(credential));
    }

    if !config.use_keyring {
        return Ok(None);
    }

    let entry = match keyring::Entry::new(&config.keyring_service, &config.keyring_user) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!("Keyring not available: {}", e);
            return Ok(None);
        }
    };

    match entry.get_password() {
        Ok(secret) => {
            tracing::debug!(service = %config.keyring_service, "Loaded API key from keyring");
            Ok(Credential::new(secret))
        }
        Err(keyring::Error::NoEntry) => {
            tracing::debug!(service = %config.keyring_service, "No API key in keyring");
            Ok(None)
        }
        Err(e) => Err(ChattyError::Keyring(e).into()),
    }
}
