//! Error types for the lektio client library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, storage, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for lektio operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, failed refresh).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// API errors (non-2xx responses with a server-provided detail).
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Durable token store errors (I/O, serialization).
    #[error("token store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (invalid API base URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the supplied credentials.
    #[error("invalid credentials: {detail}")]
    InvalidCredentials { detail: String },

    /// No usable token pair is available for an authenticated call.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The refresh exchange was rejected or unreachable. Terminal for the
    /// current request chain; the session has been cleared.
    #[error("token refresh failed: {detail}")]
    RefreshFailed { detail: String },

    /// A login completed after an intervening logout; its result was
    /// discarded.
    #[error("login superseded by logout")]
    Superseded,

    /// The access token could not be decoded.
    #[error("token decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Failures decoding the claims embedded in an access token.
///
/// Any of these is treated as "expired" by the expiry check: an
/// undecodable token is never treated as valid.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The token does not have the three dot-separated JWT segments.
    #[error("malformed token structure")]
    Malformed,

    /// The payload segment is not valid base64url.
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload decoded but is not the expected claims JSON.
    #[error("payload is not valid claims JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// API-level errors from non-2xx responses.
///
/// The backend reports failures as `{"detail": "..."}` bodies; `detail`
/// is `None` when the body could not be parsed.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Error message from the server, if present.
    pub detail: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Durable token store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be serialized or deserialized.
    #[error("storage record invalid: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },
}
