// ── Central data store ──
//
// One typed `QueryCache` per payload shape. Cross-cutting operations
// (invalidate by key prefix, removal) fan out to every cache so callers
// never need to know which cache owns a key.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::{Pages, QueryCache, QueryKey};
use crate::model::{Address, Product, ProductPage, UserProfile};

/// Every cached server-owned snapshot the client holds.
pub struct DataStore {
    /// `None` inside the entry means "checked, nobody signed in".
    pub(crate) profile: QueryCache<Option<UserProfile>>,
    pub(crate) addresses: QueryCache<Vec<Address>>,
    pub(crate) products: QueryCache<ProductPage>,
    pub(crate) product_pages: QueryCache<Pages<Product>>,
    pub(crate) category_ids: QueryCache<Vec<String>>,
    /// Untyped entries for views outside this crate (wishlist, cart, orders).
    pub(crate) external: QueryCache<serde_json::Value>,
    pub(crate) last_invalidation: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_invalidation, _) = watch::channel(None);

        Self {
            profile: QueryCache::new("profile"),
            addresses: QueryCache::new("addresses"),
            products: QueryCache::new("products"),
            product_pages: QueryCache::new("product-pages"),
            category_ids: QueryCache::new("category-ids"),
            external: QueryCache::new("external"),
            last_invalidation,
        }
    }

    // ── Cache handles ────────────────────────────────────────────────

    pub fn profile(&self) -> &QueryCache<Option<UserProfile>> {
        &self.profile
    }

    pub fn addresses(&self) -> &QueryCache<Vec<Address>> {
        &self.addresses
    }

    pub fn products(&self) -> &QueryCache<ProductPage> {
        &self.products
    }

    pub fn product_pages(&self) -> &QueryCache<Pages<Product>> {
        &self.product_pages
    }

    pub fn category_ids(&self) -> &QueryCache<Vec<String>> {
        &self.category_ids
    }

    pub fn external(&self) -> &QueryCache<serde_json::Value> {
        &self.external
    }

    // ── Cross-cache operations ───────────────────────────────────────

    /// Invalidate every entry under `prefix`, whichever cache holds it.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let touched = self.profile.invalidate(prefix)
            + self.addresses.invalidate(prefix)
            + self.products.invalidate(prefix)
            + self.product_pages.invalidate(prefix)
            + self.category_ids.invalidate(prefix)
            + self.external.invalidate(prefix);
        self.last_invalidation
            .send_modify(|at| *at = Some(Utc::now()));
        touched
    }

    pub fn invalidate_all(&self, prefixes: &[QueryKey]) -> usize {
        prefixes.iter().map(|p| self.invalidate(p)).sum()
    }

    /// Drop every entry under `prefix`, data included.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        self.profile.remove(prefix)
            + self.addresses.remove(prefix)
            + self.products.remove(prefix)
            + self.product_pages.remove(prefix)
            + self.category_ids.remove(prefix)
            + self.external.remove(prefix)
    }

    pub fn last_invalidation(&self) -> Option<DateTime<Utc>> {
        *self.last_invalidation.borrow()
    }

    pub fn subscribe_invalidations(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_invalidation.subscribe()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
