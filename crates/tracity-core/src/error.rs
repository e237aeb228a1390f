use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur in Tracity.
/// It uses the `thiserror` crate for ergonomic error handling and automatic conversion
/// from underlying library errors.
///
/// # Error Conversion
///
/// Most errors automatically convert from their source types using the `#[from]` attribute:
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// # Examples
///
/// ```no_run
/// use tracity_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::CollectionNotFound("crimes".to_string()))
/// }
/// ```
///
/// # Completion Error Classification
///
/// Errors returned by completion APIs are classified into specific categories
/// so callers can tell configuration problems from transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Authentication failure (401, invalid API key)
    Authentication,
    /// Rate limit exceeded (429)
    RateLimit,
    /// Quota exceeded (insufficient_quota)
    QuotaExceeded,
    /// Server error (5xx)
    ServerError,
    /// Network/connection error
    NetworkError,
    /// Unknown or unclassified error
    Unknown,
}

/// Structured error details from a completion API.
#[derive(Debug, Clone)]
pub struct LlmErrorDetails {
    /// Provider that produced the error ("openai", "gemini")
    pub provider: &'static str,
    /// The specific error category
    pub kind: LlmErrorKind,
    /// Human-readable error message from the API
    pub message: String,
    /// HTTP status code (0 when no response was received)
    pub status_code: u16,
}

impl LlmErrorDetails {
    pub fn new(
        provider: &'static str,
        kind: LlmErrorKind,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
            status_code,
        }
    }
}

impl std::fmt::Display for LlmErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} API error (HTTP {}): {}",
            self.provider, self.status_code, self.message
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// This error wraps all errors from SQLx database operations, including
    /// connection failures, query errors, and constraint violations.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// HTTP client request failed.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// Completion API call failed.
    ///
    /// Contains structured error information for better error handling.
    #[error("Completion error: {0}")]
    LlmError(LlmErrorDetails),

    /// JSON serialization or deserialization failed.
    ///
    /// This error occurs when converting between Rust types and JSON,
    /// typically when parsing completion replies or stored documents.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The requested collection does not exist in the document store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The collection exists but holds no documents.
    #[error("No data found in collection: {0}")]
    NoData(String),

    /// API response contained no data.
    #[error("Empty response from API")]
    EmptyResponse,

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Configuration error.
    ///
    /// Raised when the collection catalog is malformed, or when a completion
    /// provider is selected without the credentials it needs.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                if e.to_string().contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Try: docker-compose up -d".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::LlmError(details) => match details.kind {
                LlmErrorKind::Authentication => format!(
                    "Invalid {} API key.\n   Check your API key environment variable.",
                    details.provider
                ),
                LlmErrorKind::RateLimit => format!(
                    "{} rate limit reached.\n   Wait a moment and try again.",
                    details.provider
                ),
                LlmErrorKind::QuotaExceeded => format!(
                    "{} quota exceeded.\n   Check your account billing.",
                    details.provider
                ),
                LlmErrorKind::ServerError => format!(
                    "{} server error (HTTP {}).\n   Please try again later.",
                    details.provider, details.status_code
                ),
                LlmErrorKind::NetworkError => format!(
                    "Network error connecting to {}: {}\n   Check your internet connection.",
                    details.provider, details.message
                ),
                LlmErrorKind::Unknown => {
                    format!("{} error: {}", details.provider, details.message)
                }
            },
            AppError::CollectionNotFound(name) => {
                format!(
                    "Collection '{}' not found.\n   Run `tracity explore` to list available collections.",
                    name
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be overloaded. Try again later.",
                    secs
                )
            }
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Check your configuration file.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}
