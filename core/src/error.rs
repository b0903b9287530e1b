//! Error taxonomy for the Markup AI client.
//!
//! # Design
//! Every failure is a single `Error` value tagged with an `ErrorKind`. Kinds
//! produced from an HTTP response are chosen by status code and carry an
//! `ErrorContext` holding the status and the raw, unparsed response body so
//! callers can log exactly what the server said. Failures that happen before
//! a response exists (connection refused, timeouts, local file validation)
//! have a status code of `0` and no context.
//!
//! The library never retries. `Error::is_retryable` exposes the distinction
//! callers need to build their own backoff loop.

use std::fmt;

use serde::Serialize;

/// Boxed error used for wrapped causes and sender failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401: the token was missing or rejected.
    Authentication,
    /// 404: the requested resource does not exist.
    NotFound,
    /// 422, or a request rejected locally before sending (bad upload).
    Validation,
    /// 429: the caller is being throttled.
    RateLimit,
    /// Any 5xx status.
    Server,
    /// Everything else: other statuses, transport failures, malformed payloads.
    Generic,
}

impl ErrorKind {
    /// Map an HTTP status code to the matching kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Authentication,
            404 => ErrorKind::NotFound,
            422 => ErrorKind::Validation,
            429 => ErrorKind::RateLimit,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Server => "server",
            ErrorKind::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostics attached to errors built from an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub status_code: u16,
    /// The response body exactly as received.
    pub response_body: String,
}

/// A failed client operation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status_code: u16,
    context: Option<ErrorContext>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: 0,
            context: None,
            source: None,
        }
    }

    /// Build the error for a non-2xx response. The kind follows the status.
    pub fn from_response(status: u16, message: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::from_status(status),
            message: message.into(),
            status_code: status,
            context: Some(ErrorContext {
                status_code: status,
                response_body: body.into(),
            }),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the failed response, or `0` if none was received.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }

    /// Raw body of the failed response, if there was one.
    pub fn response_body(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.response_body.as_str())
    }

    /// True for throttling and server-side failures. Authentication and
    /// validation failures will not succeed on a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimit | ErrorKind::Server)
    }
}
