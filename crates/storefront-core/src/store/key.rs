use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ProductFilters;

/// Structured identifier of a cached query.
///
/// Ordered segments, compared by value. Invalidation uses prefix matching:
/// `["products"]` covers every product query regardless of filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    // ── Well-known keys ─────────────────────────────────────────────

    pub fn profile() -> Self {
        Self::new(["profile"])
    }

    pub fn addresses() -> Self {
        Self::new(["addresses"])
    }

    pub fn wishlist() -> Self {
        Self::new(["wishlist"])
    }

    pub fn cart() -> Self {
        Self::new(["cart"])
    }

    pub fn orders() -> Self {
        Self::new(["orders", "list"])
    }

    /// Prefix covering every product read.
    pub fn products() -> Self {
        Self::new(["products"])
    }

    pub fn product_list(filters: &ProductFilters, page: u32) -> Self {
        Self::new([
            "products".to_owned(),
            filters.key_segment(),
            format!("page={page}"),
        ])
    }

    pub fn products_infinite(filters: &ProductFilters) -> Self {
        Self::new(["products", "infinite", filters.key_segment().as_str()])
    }

    pub fn products_by_category(slug: &str, filters: &ProductFilters) -> Self {
        Self::new(["products", "category", slug, filters.key_segment().as_str()])
    }

    pub fn category_ids(slug: &str) -> Self {
        Self::new(["category-ids", slug])
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// `true` if `prefix`'s segments are a leading run of ours.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Canonical serialized form, e.g. `["orders","list"]`.
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching() {
        let filters = ProductFilters::default();
        let key = QueryKey::products_infinite(&filters);
        assert!(key.starts_with(&QueryKey::products()));
        assert!(key.starts_with(&key));
        assert!(!QueryKey::products().starts_with(&key));
        assert!(!QueryKey::profile().starts_with(&QueryKey::addresses()));
    }

    #[test]
    fn equal_segments_are_equal_keys() {
        assert_eq!(QueryKey::new(["orders", "list"]), QueryKey::orders());
        assert_eq!(QueryKey::orders().encode(), r#"["orders","list"]"#);
        assert_eq!(QueryKey::orders().to_string(), "orders/list");
    }
}
