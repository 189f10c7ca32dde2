//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid URL format: '{url}'")]
    InvalidUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// Retryable failures of a single remote call.
///
/// Conditions that end an invocation early (bad credentials, state already
/// reached) are not errors here; they surface as
/// [`crate::traits::TerminalReason`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// No response was received (DNS, connect, TLS, proxy, timeout).
    #[error("Network or unknown error: {reason}")]
    Transport { reason: String },

    #[error("Status: {status} | Message: {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body the caller could not use.
    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}
