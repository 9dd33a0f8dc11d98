//! Failure taxonomy for remote content API calls.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Likely reason behind a 403/429 response.
///
/// The three causes need different fixes from an operator, so they are
/// kept apart instead of being folded into a single permission error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForbiddenCause {
    /// API rate limit exhausted. `reset` is the Unix time the quota refills.
    RateLimited { reset: Option<u64> },
    /// Token lacks an SSO authorization for the owning organization.
    SsoRequired,
    /// Token scope does not cover the repository (commonly a private repo).
    InsufficientScope,
}

impl std::fmt::Display for ForbiddenCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimited { reset: Some(reset) } => {
                write!(f, "rate limit exhausted (resets at unix time {})", reset)
            }
            Self::RateLimited { reset: None } => write!(f, "rate limit exhausted"),
            Self::SsoRequired => write!(f, "SSO authorization required"),
            Self::InsufficientScope => write!(f, "insufficient token scope"),
        }
    }
}

/// Errors returned by a [`ContentSource`](super::ContentSource).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Repository, branch, or path does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// Credential rejected
    #[error("Authentication failed for {repository}: {message}")]
    AuthFailure { repository: String, message: String },

    /// Credential accepted but access denied or throttled
    #[error("Access to {repository} forbidden ({cause}): {message}")]
    Forbidden {
        repository: String,
        cause: ForbiddenCause,
        message: String,
    },

    /// Any other failure talking to the remote API
    #[error("Upstream error{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },
}

impl RemoteError {
    /// Creates a not-found error describing the missing object.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates an upstream error without an HTTP status (transport, decoding).
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// True for the expected "try the next candidate" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Operator facing remediation hint for fatal errors.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("check the repository owner, name, and CONTENT_BRANCH")
            }
            Self::AuthFailure { .. } => Some("GITHUB_TOKEN is invalid or expired"),
            Self::Forbidden { cause, .. } => Some(match cause {
                ForbiddenCause::RateLimited { .. } => {
                    "wait for the rate limit window to reset, then retry the build"
                }
                ForbiddenCause::SsoRequired => {
                    "authorize GITHUB_TOKEN for the organization's SAML single sign-on"
                }
                ForbiddenCause::InsufficientScope => {
                    "grant GITHUB_TOKEN read access to repository contents (repo scope for private repositories)"
                }
            }),
            Self::Upstream { .. } => None,
        }
    }
}

/// Classifies a non-success API response.
///
/// # Arguments
///
/// * `status`: Response status code
/// * `headers`: Response headers (rate limit and SSO markers)
/// * `message`: Error message extracted from the response body
/// * `repository`: `owner/name` used in diagnostics
/// * `what`: Description of the requested object for not-found errors
pub fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    message: &str,
    repository: &str,
    what: &str,
) -> RemoteError {
    let lowered = message.to_lowercase();
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    match status {
        StatusCode::UNAUTHORIZED => RemoteError::AuthFailure {
            repository: repository.to_string(),
            message: message.to_string(),
        },
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let exhausted = header_str("x-ratelimit-remaining") == Some("0");
            let cause = if exhausted
                || lowered.contains("rate limit")
                || status == StatusCode::TOO_MANY_REQUESTS
            {
                ForbiddenCause::RateLimited {
                    reset: header_str("x-ratelimit-reset").and_then(|v| v.parse().ok()),
                }
            } else if headers.contains_key("x-github-sso")
                || lowered.contains("saml")
                || lowered.contains("sso")
            {
                ForbiddenCause::SsoRequired
            } else {
                ForbiddenCause::InsufficientScope
            };

            RemoteError::Forbidden {
                repository: repository.to_string(),
                cause,
                message: message.to_string(),
            }
        }
        StatusCode::NOT_FOUND => RemoteError::NotFound {
            what: what.to_string(),
        },
        other => RemoteError::Upstream {
            status: Some(other.as_u16()),
            message: if message.is_empty() {
                other.to_string()
            } else {
                message.to_string()
            },
        },
    }
}

/// Result type for remote content operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
