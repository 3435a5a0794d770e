use serde::{Deserialize, Serialize};

/// Unified error type for all Zoho Books and Zoho OAuth operations.
///
/// All variants are serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError) - network connectivity issues
/// - [`Timeout`](Self::Timeout) - request timed out
/// - [`RateLimited`](Self::RateLimited) - API rate limit exceeded
/// - [`ServerError`](Self::ServerError) - HTTP 5xx from Zoho
///
/// The built-in HTTP client retries these with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ZohoError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original response body, if any.
        raw_message: Option<String>,
    },

    /// Zoho answered with HTTP 5xx.
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Original response body, if any.
        raw_message: Option<String>,
    },

    /// The Books API rejected the access token (HTTP 401).
    ///
    /// Callers are expected to refresh the token once and retry.
    Unauthorized {
        /// Zoho error code, if the body carried one.
        raw_code: Option<String>,
        /// Zoho error message, if the body carried one.
        raw_message: Option<String>,
    },

    /// The OAuth token endpoint rejected the refresh token, authorization code or client.
    InvalidCredentials {
        /// OAuth error code (e.g. `invalid_code`, `invalid_client`).
        raw_code: Option<String>,
        /// Human-readable detail, if available.
        raw_message: Option<String>,
    },

    /// The Books API rejected the request (4xx other than 401/429).
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Zoho error code from the response body.
        raw_code: Option<String>,
        /// Zoho error message from the response body.
        raw_message: String,
    },

    /// Failed to parse a Zoho response.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// A configuration value (region, base URL, client setup) is invalid.
    InvalidConfig {
        /// Name of the offending setting.
        field: String,
        /// Description of what's wrong.
        detail: String,
    },
}

impl ZohoError {
    /// Whether the failure is transient and the request may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::ServerError { .. }
        )
    }

    /// Whether the failure is expected behavior (bad input, revoked token, missing
    /// resource). Used to pick `warn` over `error` when logging.
    ///
    /// **Keep in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidCredentials { .. }
                | Self::ApiError { .. }
                | Self::InvalidConfig { .. }
        )
    }
}

impl std::fmt::Display for ZohoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::RateLimited { retry_after, .. } => {
                if let Some(secs) = retry_after {
                    write!(f, "Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "Rate limited")
                }
            }
            Self::ServerError { status, .. } => write!(f, "Zoho server error (HTTP {status})"),
            Self::Unauthorized { raw_message, .. } => {
                if let Some(msg) = raw_message {
                    write!(f, "Unauthorized: {msg}")
                } else {
                    write!(f, "Unauthorized")
                }
            }
            Self::InvalidCredentials {
                raw_code,
                raw_message,
            } => match (raw_code, raw_message) {
                (Some(code), Some(msg)) => write!(f, "Invalid credentials ({code}): {msg}"),
                (Some(code), None) => write!(f, "Invalid credentials ({code})"),
                (None, Some(msg)) => write!(f, "Invalid credentials: {msg}"),
                (None, None) => write!(f, "Invalid credentials"),
            },
            Self::ApiError {
                status,
                raw_code,
                raw_message,
            } => {
                if let Some(code) = raw_code {
                    write!(f, "Zoho API error {code} (HTTP {status}): {raw_message}")
                } else {
                    write!(f, "Zoho API error (HTTP {status}): {raw_message}")
                }
            }
            Self::ParseError { detail } => write!(f, "Parse error: {detail}"),
            Self::SerializationError { detail } => write!(f, "Serialization error: {detail}"),
            Self::InvalidConfig { field, detail } => {
                write!(f, "Invalid configuration '{field}': {detail}")
            }
        }
    }
}

impl std::error::Error for ZohoError {}

/// Convenience type alias for `Result<T, ZohoError>`.
pub type Result<T> = std::result::Result<T, ZohoError>;
