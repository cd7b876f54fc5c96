//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use storefront_config::ConfigError;
use storefront_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(storefront::not_signed_in),
        help("Run: storefront login --mobile <number> --otp <code>")
    )]
    NotSignedIn { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(storefront::request_failed))]
    RequestFailed { message: String, status: Option<u16> },

    #[error("Could not reach the storefront API: {reason}")]
    #[diagnostic(
        code(storefront::connection_failed),
        help("Check --api-url (or STOREFRONT_API_URL) and that the server is running.")
    )]
    Network { reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(storefront::not_found),
        help("Run: storefront {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(storefront::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(storefront::form))]
    Form { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(storefront::config),
        help("Inspect the effective settings with: storefront config show")
    )]
    Config(#[from] ConfigError),

    // ── Local ────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(storefront::internal))]
    Core(CoreError),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthenticated { message } => Self::NotSignedIn { message },
            CoreError::RequestFailed { message, status } => Self::RequestFailed { message, status },
            CoreError::Network { reason } => Self::Network { reason },
            CoreError::Form { message } => Self::Form { message },
            other => Self::Core(other),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotSignedIn { .. } => exit_code::AUTH,
            Self::RequestFailed {
                status: Some(404), ..
            }
            | Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Network { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::Form { .. } => exit_code::USAGE,
            Self::RequestFailed { .. } | Self::Config(_) | Self::Core(_) => exit_code::GENERAL,
        }
    }
}
