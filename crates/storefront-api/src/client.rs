// Storefront API HTTP client
//
// Wraps `reqwest::Client` with base-URL path joining, cookie-session
// credentials, status checking, and best-effort error messages. Endpoint
// groups (customers, addresses, catalog) are inherent methods in separate
// files to keep this module focused on transport mechanics.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::DEVICE_ID_HEADER;
use crate::envelope;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the storefront customer API.
///
/// All methods return decoded payloads; envelopes are normalized before
/// the caller sees them (see [`envelope`]).
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: Url,
    /// Persisted device correlation id, attached to auth-service calls.
    device_id: Option<String>,
}

impl StorefrontClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root including any version prefix
    /// (e.g. `http://localhost:8018/api/v1`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            device_id: None,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            device_id: None,
        }
    }

    /// Attach the device correlation id sent as `X-Device-Id`.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The device id attached to auth-service calls, if any.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join `path` onto the base URL, keeping the base's own path prefix.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request builders ─────────────────────────────────────────────

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        debug!("GET {}", url);
        self.http.get(url)
    }

    pub(crate) fn post(&self, url: Url, body: &(impl Serialize + ?Sized)) -> RequestBuilder {
        debug!("POST {}", url);
        self.http.post(url).json(body)
    }

    pub(crate) fn put(&self, url: Url, body: &(impl Serialize + ?Sized)) -> RequestBuilder {
        debug!("PUT {}", url);
        self.http.put(url).json(body)
    }

    pub(crate) fn delete(&self, url: Url) -> RequestBuilder {
        debug!("DELETE {}", url);
        self.http.delete(url)
    }

    /// Attach `X-Device-Id` when a device id is known.
    pub(crate) fn with_device(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.device_id.as_deref() {
            Some(id) if !id.is_empty() => builder.header(DEVICE_ID_HEADER, id),
            _ => builder,
        }
    }

    // ── Response handling ────────────────────────────────────────────

    /// Send the request. Transport failures surface as [`Error::Transport`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        trace!(status = %resp.status(), "response received");
        Ok(resp)
    }

    /// Require a 2xx status and decode the body as JSON.
    ///
    /// Non-2xx bodies become [`Error::RequestFailed`] carrying the body's
    /// message, or `fallback` when the body has none. Empty 2xx bodies
    /// decode as `null`.
    pub(crate) async fn json_body(&self, resp: Response, fallback: &str) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::failure(status, resp, fallback).await);
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|_| {
            let preview: String = text.chars().take(200).collect();
            Error::UnexpectedShape {
                entity: "json",
                body: preview,
            }
        })
    }

    /// Require a 2xx status, ignoring the body.
    pub(crate) async fn expect_success(&self, resp: Response, fallback: &str) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::failure(status, resp, fallback).await)
        }
    }

    async fn failure(status: StatusCode, resp: Response, fallback: &str) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = envelope::error_message(&raw).unwrap_or_else(|| fallback.to_owned());
        debug!(status = status.as_u16(), %message, "request failed");
        Error::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }
}
