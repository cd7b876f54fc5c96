use serde::{Deserialize, Serialize};

pub use storefront_api::{PageMeta, Product, ProductPage};

/// Pseudo-category that expands to several real ones.
pub const JEWELRY_SET_SLUG: &str = "jewelry-set";

/// Real category slugs a jewelry set is made of.
pub const JEWELRY_SET_SLUGS: [&str; 4] = ["pendant", "earring", "bracelet", "necklace"];

/// Client-side product filters. Part of the cache key for product reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductFilters {
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub search: Option<String>,
}

impl ProductFilters {
    /// Stable string form used inside cache keys.
    pub fn key_segment(&self) -> String {
        let opt = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        format!(
            "min={};max={};q={}",
            opt(self.min_price),
            opt(self.max_price),
            self.search.as_deref().unwrap_or_default()
        )
    }
}

/// Slugs a category resolves through: itself, or the jewelry-set members.
pub fn expand_category_slug(slug: &str) -> Vec<&str> {
    if slug == JEWELRY_SET_SLUG {
        JEWELRY_SET_SLUGS.to_vec()
    } else {
        vec![slug]
    }
}
