//! Error types for Kong Admin API operations.
//!
//! This module provides the error taxonomy shared by every resource client, together with
//! the status classifier that turns one HTTP exchange into either a body to decode or a
//! typed error.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for Kong Admin API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The admin API rejected the credentials (401 or 403).
    #[error("not authorised, message from kong: {0}")]
    Unauthorized(String),

    /// The admin API rejected the payload (400).
    #[error("bad request, message from kong: {0}")]
    BadRequest(String),

    /// The request could not be sent or its response could not be read.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// A successful response did not match the expected shape.
    #[error("could not parse response: {0}")]
    Decode(String),

    /// The admin API answered without an error status but the operation did not take effect.
    #[error("could not {operation}, error: {body}")]
    OperationFailed {
        /// Operation that failed, e.g. `register the service`
        operation: String,
        /// Raw response body returned by Kong
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Kong operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Transport(_) => "TRANSPORT_FAILURE",
            Self::Decode(_) => "DECODE_FAILURE",
            Self::OperationFailed { .. } => "OPERATION_FAILED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Build an [`Error::OperationFailed`] carrying the raw response body.
    #[must_use]
    pub fn operation_failed(operation: impl Into<String>, body: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            body: body.into(),
        }
    }

    /// Returns true when the admin API refused the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Which status codes an operation treats as failures before decoding the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only 401 and 403 are failures.
    Authorization,
    /// 401, 403 and 400 are failures.
    AuthorizationAndBadRequest,
}

/// Classify one admin API exchange.
///
/// Returns the body untouched when the status is not a failure under `policy`. Kong answers
/// missing single resources with an identifier-less body rather than a dedicated status, so
/// every other status, 404 included, is left for the caller to decode.
///
/// # Errors
///
/// Returns [`Error::Unauthorized`] for 401/403 and, under
/// [`StatusPolicy::AuthorizationAndBadRequest`], [`Error::BadRequest`] for 400. Both embed the
/// body verbatim.
pub fn classify(status: StatusCode, body: String, policy: StatusPolicy) -> Result<String> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized(body)),
        StatusCode::BAD_REQUEST if policy == StatusPolicy::AuthorizationAndBadRequest => {
            Err(Error::BadRequest(body))
        }
        _ => Ok(body),
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Unauthorized("test".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            Error::BadRequest("test".to_string()).error_code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            Error::Transport("test".to_string()).error_code(),
            "TRANSPORT_FAILURE"
        );
        assert_eq!(
            Error::Decode("test".to_string()).error_code(),
            "DECODE_FAILURE"
        );
        assert_eq!(
            Error::operation_failed("update service", "{}").error_code(),
            "OPERATION_FAILED"
        );
        assert_eq!(
            Error::Config("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display_embeds_body() {
        let err = Error::Unauthorized(r#"{"message":"Invalid authentication credentials"}"#.into());
        assert_eq!(
            err.to_string(),
            r#"not authorised, message from kong: {"message":"Invalid authentication credentials"}"#
        );

        let err = Error::operation_failed("register the service", r#"{"message":"boom"}"#);
        assert_eq!(
            err.to_string(),
            r#"could not register the service, error: {"message":"boom"}"#
        );
    }

    #[test]
    fn classify_maps_authorization_statuses() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            for policy in [
                StatusPolicy::Authorization,
                StatusPolicy::AuthorizationAndBadRequest,
            ] {
                let err = classify(status, "denied".into(), policy).unwrap_err();
                assert_eq!(err, Error::Unauthorized("denied".into()));
                assert!(err.is_unauthorized());
            }
        }
    }

    #[test]
    fn classify_bad_request_depends_on_policy() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            "schema violation".into(),
            StatusPolicy::AuthorizationAndBadRequest,
        )
        .unwrap_err();
        assert_eq!(err, Error::BadRequest("schema violation".into()));

        let body = classify(
            StatusCode::BAD_REQUEST,
            "schema violation".into(),
            StatusPolicy::Authorization,
        )
        .unwrap();
        assert_eq!(body, "schema violation");
    }

    #[test]
    fn classify_passes_other_statuses_through() {
        for status in [
            StatusCode::OK,
            StatusCode::CREATED,
            StatusCode::NO_CONTENT,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let body = classify(status, "{}".into(), StatusPolicy::AuthorizationAndBadRequest)
                .unwrap();
            assert_eq!(body, "{}");
        }
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let kong_err: Error = err.into();
        assert!(matches!(kong_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let kong_err: Error = err.into();
        assert!(matches!(kong_err, Error::Decode(_)));
        assert_eq!(kong_err.error_code(), "DECODE_FAILURE");
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::BadRequest("test".to_string());
        let err2 = Error::BadRequest("test".to_string());
        let err3 = Error::BadRequest("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
