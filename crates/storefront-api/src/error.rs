use thiserror::Error;

/// Top-level error type for the `storefront-api` crate.
///
/// Covers every failure mode of the customer REST surface: session
/// resolution, transport, non-2xx responses, and envelope drift.
/// `storefront-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No resolvable session or customer id. Raised before any request
    /// is issued when the caller is the guest sentinel.
    #[error("{message}")]
    Unauthenticated { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the best human-readable text the
    /// body offered, or the operation's fallback.
    #[error("{message} (HTTP {status})")]
    RequestFailed { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// None of the known envelope shapes matched, with the raw body for debugging.
    #[error("Unexpected {entity} response shape")]
    UnexpectedShape { entity: &'static str, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestFailed { status: 404, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
