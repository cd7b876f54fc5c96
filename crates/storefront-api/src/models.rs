// Wire types for the customer REST API
//
// Field names follow the backend's camelCase JSON with Mongo-style `_id`.
// Response types use `#[serde(default)]` liberally because the backend is
// inconsistent about field presence; request types only carry fields the
// backend accepts, so derived fields (ids, timestamps) can never leak out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Customer ─────────────────────────────────────────────────────────

/// Customer record from `GET /customers/me`.
///
/// `id` defaults to empty so a body without `_id` decodes and is then
/// treated as "no session" rather than a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: String,
}

/// Partial profile update body for `PUT /customers/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

/// Token carried by some login responses.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginToken {
    #[serde(default)]
    pub token: Option<String>,
}

// ── Address ──────────────────────────────────────────────────────────

/// Address record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update body for address endpoints.
///
/// Every field is optional so the same type serves full creates and
/// partial updates; absent fields are omitted from the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl AddressPayload {
    /// The body `set default` sends: `{ "isDefault": true }` and nothing else.
    pub fn make_default() -> Self {
        Self {
            is_default: Some(true),
            ..Self::default()
        }
    }
}

impl From<&Address> for AddressPayload {
    /// Strip server-owned fields (id, owner, timestamps) from a stored address.
    fn from(a: &Address) -> Self {
        Self {
            label: Some(a.label.clone()),
            full_name: Some(a.full_name.clone()),
            line1: Some(a.line1.clone()),
            line2: a.line2.clone(),
            city: Some(a.city.clone()),
            state: Some(a.state.clone()),
            pincode: Some(a.pincode.clone()),
            country: a.country.clone(),
            is_default: Some(a.is_default),
        }
    }
}

// ── Catalog ──────────────────────────────────────────────────────────

/// Product listing entry. Only the fields the client reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    /// Catch-all for fields the client doesn't interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Pagination block reported alongside each product page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One page of `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(alias = "products")]
    pub items: Vec<Product>,
    pub meta: PageMeta,
}

/// Category record; only the id is needed for product filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
}

/// Query filters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category_ids: Vec<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs in a stable order; empty filters are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.category_ids.is_empty() {
            pairs.push(("categoryId", self.category_ids.join(",")));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.to_string()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
