//! Domain-level error types.
//!
//! These errors are transport agnostic. Whatever renders the household screens
//! maps them to user-facing messages; every failure the core reports is a
//! value of [`DomainError`], never a panic.

use serde::Serialize;
use serde_json::Value;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required field is empty or a value is out of range.
    InvalidRequest,
    /// The identity provider rejected the credentials or the session.
    Unauthorized,
    /// Sign-up succeeded but the provider has not issued a usable identity.
    Unconfirmed,
    /// The requested family, meal, or account does not exist.
    NotFound,
    /// A persisted collection or the identity provider is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed; blank messages are replaced by a
///   generic description of the code.
///
/// # Examples
/// ```
/// use famealy::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::not_found("invalid invitation code");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "invalid invitation code");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl DomainError {
    /// Create a new error for `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let raw = message.into();
        let text = if raw.trim().is_empty() {
            fallback_message(code).to_owned()
        } else {
            raw
        };
        Self {
            code,
            message: text,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message suitable for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use famealy::domain::DomainError;
    /// use serde_json::json;
    ///
    /// let err = DomainError::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Unconfirmed`].
    pub fn unconfirmed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unconfirmed, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

fn fallback_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequest => "invalid request",
        ErrorCode::Unauthorized => "not authorised",
        ErrorCode::Unconfirmed => "account not confirmed",
        ErrorCode::NotFound => "not found",
        ErrorCode::ServiceUnavailable => "service unavailable",
        ErrorCode::InternalError => "internal error",
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}
