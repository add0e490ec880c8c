//! Error types for the DDNS system
//!
//! This module defines all error types used throughout the crate.
//!
//! The reconciler treats [`Error::Transport`], [`Error::Provider`] and
//! [`Error::NotFound`] the same way: the affected domain is marked failed and
//! the pass moves on to the next domain.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure, timeout, or a response body that is not the expected JSON
    #[error("Transport error: {0}")]
    Transport(String),

    /// Well-formed provider response with `success: false`
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Messages returned by the provider, joined
        message: String,
    },

    /// Lookup returned no match (e.g. no zone for a top-level domain)
    #[error("Not found: {0}")]
    NotFound(String),

    /// IP source-related errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem errors (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error came from talking to the DNS provider
    /// (as opposed to local configuration or input problems).
    pub fn is_provider_side(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Provider { .. } | Self::NotFound(_)
        )
    }
}
