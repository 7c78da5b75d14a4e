//! Chat room configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::application::chat::{RoomSettings, DEFAULT_MAILBOX_CAPACITY};
use crate::domain::chat::WordListFilter;
use crate::domain::identity::TokenCodec;

use super::error::ValidationError;
use super::server::Environment;

/// Upper bound on per-user pending messages.
pub const MAX_MAILBOX_CAPACITY: usize = 1024;

/// Upper bound on the shutdown drain window.
pub const MAX_DRAIN_SECS: u64 = 60;

/// Minimum secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 16;

/// Chat room configuration
///
/// The token secret has no default: a deployment without one would accept
/// forged reconnect tokens.
#[derive(Debug, Deserialize)]
pub struct ChatConfig {
    /// Key for reconnect token HMACs
    pub token_secret: SecretString,

    /// Pending messages per user before broadcasts to that user are dropped
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Words masked out of chat content (comma-separated)
    pub sensitive_words: Option<String>,

    /// Seconds a closing session may spend flushing its mailbox
    #[serde(default = "default_shutdown_drain_secs")]
    pub shutdown_drain_secs: u64,
}

impl ChatConfig {
    /// Creates a config with defaults around the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            token_secret: SecretString::new(secret.into()),
            mailbox_capacity: default_mailbox_capacity(),
            sensitive_words: None,
            shutdown_drain_secs: default_shutdown_drain_secs(),
        }
    }

    /// Get sensitive words as a vector
    pub fn sensitive_words_list(&self) -> Vec<String> {
        self.sensitive_words
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds the content filter for the configured words
    pub fn content_filter(&self) -> WordListFilter {
        WordListFilter::new(self.sensitive_words_list())
    }

    /// Builds the token codec keyed with the configured secret
    pub fn token_codec(&self) -> TokenCodec {
        TokenCodec::new(SecretString::new(
            self.token_secret.expose_secret().clone(),
        ))
    }

    /// Session tunables
    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            mailbox_capacity: self.mailbox_capacity,
            drain_timeout: Duration::from_secs(self.shutdown_drain_secs),
        }
    }

    /// Validate chat configuration
    ///
    /// In production, short secrets are rejected as well as empty ones.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret_len = self.token_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ValidationError::MissingRequired("CHAT__TOKEN_SECRET"));
        }
        if *environment == Environment::Production && secret_len < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::WeakTokenSecret(MIN_PRODUCTION_SECRET_BYTES));
        }
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAX_MAILBOX_CAPACITY {
            return Err(ValidationError::InvalidMailboxCapacity(MAX_MAILBOX_CAPACITY));
        }
        if self.shutdown_drain_secs == 0 || self.shutdown_drain_secs > MAX_DRAIN_SECS {
            return Err(ValidationError::InvalidDrainTimeout(MAX_DRAIN_SECS));
        }
        Ok(())
    }
}

fn default_mailbox_capacity() -> usize {
    DEFAULT_MAILBOX_CAPACITY
}

fn default_shutdown_drain_secs() -> u64 {
    5
}
