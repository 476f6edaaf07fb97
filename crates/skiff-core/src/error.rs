//! Error types for the skiff client layer.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, HTTP status, and input validation errors.

use std::fmt;
use thiserror::Error;

/// Fixed message substituted for a 404 response that carries no server message.
pub const NOT_FOUND_MESSAGE: &str = "not found";

/// Fixed fallback shown when a failure carries no message of its own.
pub const NETWORK_FAILED_MESSAGE: &str = "network connection failed";

/// The unified error type for skiff operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// No bearer token could be obtained for an authenticated request.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The remote answered with a status outside 2xx.
    #[error("http error: {0}")]
    Http(#[from] HttpError),

    /// The network call itself failed before yielding a status.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The user declined the file picker.
    #[error("cancelled by user")]
    Cancelled,

    /// A server response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Input validation errors (invalid remote root, bad configuration).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// The human-facing message for this failure, when it carries one.
    ///
    /// Used by the error presenter; callers substitute
    /// [`NETWORK_FAILED_MESSAGE`] when this returns `None`.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Error::Http(e) => e.message.clone(),
            Error::Auth(e) => Some(e.to_string()),
            Error::Transport(e) => Some(e.to_string()),
            Error::Cancelled => None,
            Error::Decode(_) => None,
            Error::InvalidInput(e) => Some(e.to_string()),
        }
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login exchange response omitted the token.
    #[error("login response missing token")]
    MissingToken,

    /// A shared in-flight login settled with an error.
    #[error("login failed: {message}")]
    LoginFailed { message: String },
}

/// An HTTP status outside the 2xx range, with the server's message if any.
#[derive(Debug)]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the response body, or a protocol fallback.
    pub message: Option<String>,
}

impl HttpError {
    /// Classify a non-2xx response.
    ///
    /// A 404 with no server message gets the fixed "not found" message;
    /// otherwise the message may be absent.
    pub fn new(status: u16, message: Option<String>) -> Self {
        let message = match message {
            None if status == 404 => Some(NOT_FOUND_MESSAGE.to_string()),
            other => other,
        };
        Self { status, message }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP-layer failure (TLS, redirect loop, body stream).
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// A local file could not be read for upload.
    #[error("file read failed: {message}")]
    File { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid remote root URL.
    #[error("invalid remote root '{value}': {reason}")]
    RemoteRoot { value: String, reason: String },

    /// Client was assembled without a required collaborator.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_404_without_message_gets_fallback() {
        let err = HttpError::new(404, None);
        assert_eq!(err.message.as_deref(), Some(NOT_FOUND_MESSAGE));
    }

    #[test]
    fn http_error_404_keeps_server_message() {
        let err = HttpError::new(404, Some("no such item".into()));
        assert_eq!(err.message.as_deref(), Some("no such item"));
    }

    #[test]
    fn http_error_other_status_may_have_no_message() {
        let err = HttpError::new(500, None);
        assert!(err.message.is_none());
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn user_message_comes_from_http_body() {
        let err = Error::from(HttpError::new(500, Some("boom".into())));
        assert_eq!(err.user_message().as_deref(), Some("boom"));
    }

    #[test]
    fn cancelled_has_no_user_message() {
        assert!(Error::Cancelled.user_message().is_none());
    }
}
