//! Configuration for the storefront client.
//!
//! A TOML file in the platform config directory, overlaid with
//! `STOREFRONT_*` environment variables, translated into
//! `storefront_core::StorefrontConfig`. The core crate never reads files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use storefront_core::{
    DEFAULT_API_URL, DEFAULT_PAGE_SIZE, QueryPolicies, QueryPolicy, StorefrontConfig, SubmitPolicy,
};

const ENV_PREFIX: &str = "STOREFRONT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.to_string(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// API root including version prefix.
    pub api_url: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Local storage file (device id, auth token). Defaults to the
    /// platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    /// `close-on-success` or `close-immediately`.
    pub submit_policy: String,

    pub page_size: u32,

    #[serde(default)]
    pub defaults: Defaults,

    /// Per-query freshness overrides.
    #[serde(default)]
    pub queries: Queries,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            timeout: 30,
            storage_path: None,
            submit_policy: SubmitPolicy::default().to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            defaults: Defaults::default(),
            queries: Queries::default(),
        }
    }
}

/// Presentation defaults for the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Queries {
    #[serde(default)]
    pub profile: QueryOverride,
    #[serde(default)]
    pub addresses: QueryOverride,
    #[serde(default)]
    pub products: QueryOverride,
    #[serde(default)]
    pub category_ids: QueryOverride,
}

/// Partial override of one query policy; unset fields keep the default.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct QueryOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl QueryOverride {
    fn apply(self, base: QueryPolicy) -> QueryPolicy {
        QueryPolicy {
            stale_time: self.stale_secs.map_or(base.stale_time, Duration::from_secs),
            retry: self.retry.unwrap_or(base.retry),
            retry_delay: self
                .retry_delay_ms
                .map_or(base.retry_delay, Duration::from_millis),
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "storefront", "storefront")
}

fn dirs_fallback(leaf: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(leaf);
    p.push("storefront");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default local storage file.
pub fn default_storage_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("storage.json"),
        |dirs| dirs.data_dir().join("storage.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is fine.
///
/// Nested keys use a double underscore: `STOREFRONT_QUERIES__ADDRESSES__RETRY=0`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate and translate into the core runtime config.
pub fn to_storefront_config(cfg: &Config) -> Result<StorefrontConfig, ConfigError> {
    let api_url = Url::parse(&cfg.api_url).map_err(|e| invalid("api_url", e))?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(invalid("api_url", "expected an http or https URL"));
    }
    if cfg.timeout == 0 {
        return Err(invalid("timeout", "must be at least one second"));
    }
    if cfg.page_size == 0 {
        return Err(invalid("page_size", "must be positive"));
    }
    let submit_policy: SubmitPolicy = cfg
        .submit_policy
        .parse()
        .map_err(|_| invalid("submit_policy", format!("unknown policy '{}'", cfg.submit_policy)))?;

    let defaults = QueryPolicies::default();
    let queries = QueryPolicies {
        profile: cfg.queries.profile.apply(defaults.profile),
        addresses: cfg.queries.addresses.apply(defaults.addresses),
        products: cfg.queries.products.apply(defaults.products),
        category_ids: cfg.queries.category_ids.apply(defaults.category_ids),
    };

    Ok(StorefrontConfig {
        api_url,
        timeout: Duration::from_secs(cfg.timeout),
        storage_path: Some(
            cfg.storage_path
                .clone()
                .unwrap_or_else(default_storage_path),
        ),
        submit_policy,
        queries,
        page_size: cfg.page_size,
    })
}
