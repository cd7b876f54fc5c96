// ── Runtime client configuration ──
//
// These types describe *how* the storefront client talks to the backend
// and how long cached reads stay fresh. They never touch disk; the CLI
// (via storefront-config) constructs a `StorefrontConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8018/api/v1";

/// Page size for paginated product reads.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Freshness and retry rules for one family of cached reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Maximum age of a cached value before the next read refetches.
    pub stale_time: Duration,
    /// Extra attempts after a transient failure. 0 = no retry.
    pub retry: u32,
    /// Base delay between retries; doubles per attempt.
    pub retry_delay: Duration,
}

impl QueryPolicy {
    pub const fn new(stale_time: Duration, retry: u32) -> Self {
        Self {
            stale_time,
            retry,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Per-query policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicies {
    /// Profile probe: a failure means "no session", so never retried.
    pub profile: QueryPolicy,
    pub addresses: QueryPolicy,
    pub products: QueryPolicy,
    /// Category slug resolution: derived lookup, not retried.
    pub category_ids: QueryPolicy,
}

impl Default for QueryPolicies {
    fn default() -> Self {
        let five_minutes = Duration::from_secs(5 * 60);
        Self {
            profile: QueryPolicy::new(five_minutes, 0),
            addresses: QueryPolicy::new(five_minutes, 2),
            products: QueryPolicy::new(five_minutes, 2),
            category_ids: QueryPolicy::new(Duration::from_secs(10 * 60), 0),
        }
    }
}

/// What a modal form does when its submission is handed off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SubmitPolicy {
    /// Close as soon as the mutation is dispatched; failures are only logged.
    CloseImmediately,
    /// Stay in `Submitting` until the mutation settles; close on success,
    /// return to `Editing` with the failure message otherwise.
    #[default]
    CloseOnSuccess,
}

/// Configuration for one storefront client.
///
/// Built by the CLI, passed to `Storefront` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// API root including version prefix.
    pub api_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// File backing local device storage. `None` keeps it in memory.
    pub storage_path: Option<PathBuf>,
    pub submit_policy: SubmitPolicy,
    pub queries: QueryPolicies,
    pub page_size: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: Duration::from_secs(30),
            storage_path: None,
            submit_policy: SubmitPolicy::default(),
            queries: QueryPolicies::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
