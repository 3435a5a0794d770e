//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use zoho_books_provider::ZohoError;

/// Remediation appended to every authentication failure.
pub const AUTH_REMEDIATION: &str =
    "run with --setup-oauth or update ZOHO_REFRESH_TOKEN and restart the server";

/// Stable error category reported to MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    AuthError,
    ApiError,
    TransientError,
    InternalError,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::AuthError => "auth_error",
            Self::ApiError => "api_error",
            Self::TransientError => "transient_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core layer error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Bad input; the request never left the process
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No usable credential (missing, expired or revoked refresh token)
    #[error("Authentication failed: {message}")]
    AuthError {
        /// Upstream OAuth code (`invalid_code`, `invalid_client`, ...), if any
        code: Option<String>,
        message: String,
    },

    /// Zoho rejected the request
    #[error("{message}")]
    ApiError {
        status: u16,
        /// Zoho error code from the response body
        code: Option<String>,
        message: String,
    },

    /// Network failure, timeout or rate limit that outlived the retry ceiling
    #[error("Temporary failure: {0}")]
    TransientError(String),

    /// Credential store failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CoreError {
    /// Authentication failure with the standard remediation hint.
    pub fn auth(code: Option<String>, reason: impl std::fmt::Display) -> Self {
        Self::AuthError {
            code,
            message: format!("{reason}; {AUTH_REMEDIATION}"),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) => ErrorKind::ValidationError,
            Self::AuthError { .. } => ErrorKind::AuthError,
            Self::ApiError { .. } => ErrorKind::ApiError,
            Self::TransientError(_) => ErrorKind::TransientError,
            Self::StorageError(_) | Self::SerializationError(_) => ErrorKind::InternalError,
        }
    }

    /// Whether it is expected behavior (bad input, revoked token, upstream rejection).
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::AuthError { .. } | Self::ApiError { .. }
        )
    }
}

impl From<ZohoError> for CoreError {
    fn from(err: ZohoError) -> Self {
        match err {
            ZohoError::NetworkError { .. }
            | ZohoError::Timeout { .. }
            | ZohoError::RateLimited { .. } => Self::TransientError(err.to_string()),
            ZohoError::ServerError { status, .. } => Self::ApiError {
                status,
                code: None,
                message: err.to_string(),
            },
            ZohoError::Unauthorized {
                ref raw_code,
                ref raw_message,
            } => Self::auth(
                raw_code.clone(),
                raw_message
                    .as_deref()
                    .unwrap_or("Zoho rejected the access token"),
            ),
            ZohoError::InvalidCredentials { ref raw_code, .. } => {
                Self::auth(raw_code.clone(), &err)
            }
            ZohoError::ApiError {
                status,
                raw_code,
                raw_message,
            } => Self::ApiError {
                status,
                code: raw_code,
                message: raw_message,
            },
            ZohoError::ParseError { detail } => Self::SerializationError(detail),
            ZohoError::SerializationError { detail } => Self::SerializationError(detail),
            ZohoError::InvalidConfig { .. } => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_transient() {
        let err: CoreError = ZohoError::Timeout {
            detail: "deadline".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::TransientError);

        let err: CoreError = ZohoError::RateLimited {
            retry_after: Some(5),
            raw_message: None,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::TransientError);
    }

    #[test]
    fn server_error_keeps_status() {
        let err: CoreError = ZohoError::ServerError {
            status: 503,
            raw_message: None,
        }
        .into();
        assert!(matches!(err, CoreError::ApiError { status: 503, .. }));
    }

    #[test]
    fn rejected_refresh_carries_remediation() {
        let err: CoreError = ZohoError::InvalidCredentials {
            raw_code: Some("invalid_code".into()),
            raw_message: None,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::AuthError);
        let CoreError::AuthError { code, message } = err else {
            panic!("expected AuthError");
        };
        assert_eq!(code.as_deref(), Some("invalid_code"));
        assert!(message.contains("--setup-oauth"));
    }

    #[test]
    fn api_error_surfaces_zoho_message() {
        let err: CoreError = ZohoError::ApiError {
            status: 400,
            raw_code: Some("1002".into()),
            raw_message: "Invoice does not exist.".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Invoice does not exist.");
        assert_eq!(err.kind().as_str(), "api_error");
    }

    #[test]
    fn local_failures_are_internal() {
        assert_eq!(
            CoreError::StorageError("disk full".into()).kind(),
            ErrorKind::InternalError
        );
        assert!(!CoreError::SerializationError("x".into()).is_expected());
    }

    #[test]
    fn serializes_with_code_tag() {
        let json = serde_json::to_value(CoreError::ValidationError("bad".into())).unwrap();
        assert_eq!(json["code"], "ValidationError");
        assert_eq!(json["details"], "bad");
    }
}
