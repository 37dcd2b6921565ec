//! Error types for the UN-data client.
//!
//! This module defines all error types that can occur during dispatch
//! operations. All errors implement the standard [`std::error::Error`] trait
//! via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Configuration** ([`ClientError::Configuration`]): malformed call
//!   arguments, rejected before any network I/O
//! - **Request** ([`ClientError::Request`]): the service answered with a
//!   non-2xx HTTP status
//! - **Transport** ([`ClientError::Transport`]): network-layer faults
//! - **Decode** ([`ClientError::Decode`]): response payloads that fail to
//!   parse where JSON/text was required

use thiserror::Error;

/// Result type alias for client operations.
///
/// This is a convenience type that uses [`ClientError`] as the error type.
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while dispatching requests.
///
/// All variants include contextual information about what went wrong.
///
/// # Error Recovery
///
/// - **Configuration errors**: fix the call arguments; no request was sent
/// - **Request errors**: inspect the carried status and body; the service
///   reports failures as a JSON object with an `error` field
/// - **Transport errors**: verify connectivity and the configured base URL
/// - **Decode errors**: the service returned a payload that is not the
///   expected JSON shape
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed call arguments.
    ///
    /// This error occurs when a call is rejected before any I/O, such as a
    /// batch whose input sequences have unequal lengths or a configuration
    /// with an unparseable base URL. No partial side effects exist when this
    /// error is returned.
    #[error("invalid request configuration: {0}")]
    Configuration(String),

    /// The service answered with a non-2xx HTTP status.
    ///
    /// Carries the status code and the response body text so callers can
    /// inspect the service's diagnostic payload.
    #[error("request failed with status {status}: {body}")]
    Request {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body text, best effort (lossy UTF-8).
        body: String,
    },

    /// HTTP request failed at the network layer.
    ///
    /// This error wraps [`reqwest::Error`] and occurs when communication
    /// with the service fails. Common causes include connection refusals,
    /// timeouts, and DNS resolution failures.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response payload could not be decoded.
    ///
    /// This error occurs when a response body is not valid JSON where JSON
    /// was required, after byte-order-mark stripping.
    #[error("response decoding failed: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = ClientError::Configuration("mismatched lengths".into());
        assert_eq!(error.to_string(), "invalid request configuration: mismatched lengths");
    }

    #[test]
    fn test_request_error_display() {
        let error = ClientError::Request { status: 404, body: "{\"error\":\"missing\"}".into() };
        assert!(error.to_string().contains("404"));
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_decode_error_display() {
        let error = ClientError::Decode("expected value at line 1".into());
        assert!(error.to_string().contains("response decoding failed"));
    }
}
