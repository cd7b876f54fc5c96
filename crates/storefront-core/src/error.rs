// ── Core error types ──
//
// User-facing errors from storefront-core. Consumers never see raw
// reqwest errors or JSON parse failures; the `From<storefront_api::Error>`
// impl folds them into the four-way taxonomy the UI renders.
// `Clone` so one in-flight fetch result can be handed to every waiter.

use thiserror::Error;

/// Generic message shown when the backend answers in a shape we can't read.
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response from server";

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    /// No resolvable session or customer id. Prompt to sign in; never retried.
    #[error("{message}")]
    Unauthenticated { message: String },

    // ── Request errors ───────────────────────────────────────────────
    /// Non-2xx response or unreadable body, with the best available message.
    #[error("{message}")]
    RequestFailed { message: String, status: Option<u16> },

    /// Transport-level failure. Eligible for read-side retries.
    #[error("Network error: {reason}")]
    Network { reason: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Local storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Form error: {message}")]
    Form { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the read-side retry policy applies.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }

    pub(crate) fn form(message: impl Into<String>) -> Self {
        Self::Form {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<storefront_api::Error> for CoreError {
    fn from(err: storefront_api::Error) -> Self {
        match err {
            storefront_api::Error::Unauthenticated { message } => Self::Unauthenticated { message },
            storefront_api::Error::RequestFailed { status, message } => Self::RequestFailed {
                message,
                status: Some(status),
            },
            storefront_api::Error::Transport(ref e) => Self::Network {
                reason: e.to_string(),
            },
            storefront_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            storefront_api::Error::Tls(message) => Self::Config { message },
            storefront_api::Error::UnexpectedShape { entity, body } => {
                tracing::warn!(entity, body = %body, "unrecognized response envelope");
                Self::RequestFailed {
                    message: UNEXPECTED_RESPONSE.into(),
                    status: None,
                }
            }
        }
    }
}
