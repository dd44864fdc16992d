//! Error types for Bastion.
//!
//! [`SecurityError`] is the single error type of the dispatch core. Only
//! [`SecurityError::RequestRejected`] is ever recovered inside the core (by a
//! rejection handler); every other variant surfaces to the caller.
//!
//! | Variant | Raised by | Recovery |
//! |---|---|---|
//! | `AlreadyBuilt` | [`BuildGuard::build`](crate::BuildGuard::build) | fatal to the caller |
//! | `InvalidState` | [`BuildGuard::get_result`](crate::BuildGuard::get_result) | fatal to the caller |
//! | `RequestRejected` | firewall, middleware | converted to a terminal response |
//! | `AmbiguousOrdering` | assembly | fatal at startup |
//! | `InvalidConfiguration` | assembly, chain validators | fatal at startup |
//! | `MiddlewareFailure` | middleware | propagates to the outer pipeline |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`SecurityError`].
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Why the firewall refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The HTTP method is not on the allow-list.
    MethodNotAllowed,
    /// The path contains a forbidden raw character (`;`, `\`, null).
    DisallowedCharacter,
    /// The path contains a forbidden percent-encoded sequence.
    DisallowedEncoding,
    /// The decoded path contains `//`, `/./` or `/../` segments.
    NonNormalizedPath,
    /// The path contains characters outside printable ASCII.
    NonPrintablePath,
    /// A header name or value contains control characters.
    InvalidHeader,
    /// The `Host` is not on the allowed host-names list.
    UntrustedHost,
    /// Rejected by application-supplied logic.
    Custom,
}

impl RejectionReason {
    /// Returns a machine-readable code for this reason.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::DisallowedCharacter => "DISALLOWED_CHARACTER",
            Self::DisallowedEncoding => "DISALLOWED_ENCODING",
            Self::NonNormalizedPath => "NON_NORMALIZED_PATH",
            Self::NonPrintablePath => "NON_PRINTABLE_PATH",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::UntrustedHost => "UNTRUSTED_HOST",
            Self::Custom => "CUSTOM",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A request refused by the firewall.
///
/// # Example
///
/// ```
/// use bastion_core::{RejectionReason, RequestRejected};
///
/// let rejected = RequestRejected::new(
///     RejectionReason::DisallowedEncoding,
///     "the URL contained a potentially malicious String \"%2e\"",
/// );
/// assert_eq!(rejected.reason(), RejectionReason::DisallowedEncoding);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request rejected ({reason}): {message}")]
pub struct RequestRejected {
    reason: RejectionReason,
    message: String,
}

impl RequestRejected {
    /// Creates a rejection with a reason and a human-readable message.
    #[must_use]
    pub fn new(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Returns the rejection reason.
    #[must_use]
    pub const fn reason(&self) -> RejectionReason {
        self.reason
    }

    /// Returns the rejection message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Standard error type for the Bastion dispatch core.
///
/// # Example
///
/// ```
/// use bastion_core::SecurityError;
///
/// let err = SecurityError::already_built("WebSecurity");
/// assert!(err.to_string().contains("already been built"));
/// ```
#[derive(Error, Debug)]
pub enum SecurityError {
    /// A build guard was asked to build a second time.
    #[error("{builder} has already been built")]
    AlreadyBuilt {
        /// Name of the builder.
        builder: String,
    },

    /// A result was accessed before it was available.
    #[error("invalid state: {message}")]
    InvalidState {
        /// What was accessed too early.
        message: String,
    },

    /// The firewall refused the request.
    #[error(transparent)]
    RequestRejected(#[from] RequestRejected),

    /// Two configuration entries claim the same explicit precedence.
    #[error(
        "order on security configurers must be unique: order {order} was already used on \
         '{previous}', so it cannot be used on '{current}' too"
    )]
    AmbiguousOrdering {
        /// The duplicated order value.
        order: i32,
        /// The entry that claimed the order first.
        previous: String,
        /// The entry that claimed it again.
        current: String,
    },

    /// The assembled configuration is unusable.
    #[error("invalid security configuration: {message}")]
    InvalidConfiguration {
        /// Description of the problem.
        message: String,
    },

    /// A middleware unit failed during execution.
    #[error("middleware '{middleware}' failed: {source}")]
    MiddlewareFailure {
        /// Name of the failing middleware.
        middleware: String,
        /// The underlying error.
        #[source]
        source: anyhow::Error,
    },
}

impl SecurityError {
    /// Creates an [`SecurityError::AlreadyBuilt`] error.
    #[must_use]
    pub fn already_built(builder: impl Into<String>) -> Self {
        Self::AlreadyBuilt {
            builder: builder.into(),
        }
    }

    /// Creates an [`SecurityError::InvalidState`] error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Creates an [`SecurityError::InvalidConfiguration`] error.
    #[must_use]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates an [`SecurityError::AmbiguousOrdering`] error.
    #[must_use]
    pub fn ambiguous_ordering(
        order: i32,
        previous: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        Self::AmbiguousOrdering {
            order,
            previous: previous.into(),
            current: current.into(),
        }
    }

    /// Wraps a failure raised inside a middleware unit.
    pub fn middleware(middleware: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::MiddlewareFailure {
            middleware: middleware.into(),
            source: source.into(),
        }
    }

    /// Returns the rejection if this error is a firewall rejection.
    #[must_use]
    pub const fn as_rejection(&self) -> Option<&RequestRejected> {
        match self {
            Self::RequestRejected(rejected) => Some(rejected),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestRejected(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyBuilt { .. } => "ALREADY_BUILT",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::RequestRejected(_) => "REQUEST_REJECTED",
            Self::AmbiguousOrdering { .. } => "AMBIGUOUS_ORDERING",
            Self::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            Self::MiddlewareFailure { .. } => "MIDDLEWARE_FAILURE",
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Client-facing messages never include internal detail: rejections
    /// expose only their reason code, everything else a generic message.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let (message, reason) = match self {
            Self::RequestRejected(rejected) => {
                ("The request was rejected".to_string(), Some(rejected.reason()))
            }
            _ => ("Internal security error".to_string(), None),
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                reason,
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Rejection reason, for firewall rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}
