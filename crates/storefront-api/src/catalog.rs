// Catalog endpoints: paginated products and category slug lookup.

use tracing::debug;

use crate::client::StorefrontClient;
use crate::envelope;
use crate::error::Error;
use crate::models::{Category, ProductPage, ProductQuery};

impl StorefrontClient {
    /// Fetch one page of products.
    ///
    /// `GET /products?categoryId=..&minPrice=..&maxPrice=..&page=..&limit=..`
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, Error> {
        let url = self.url("products")?;
        debug!(?query, "listing products");
        let resp = self.send(self.get(url).query(&query.to_pairs())).await?;
        let body = self.json_body(resp, "Failed to fetch products").await?;
        envelope::extract_root(&body, "products")
    }

    /// Resolve a category slug to its id.
    ///
    /// `GET /categories/slug/{slug}`. Unknown slugs (404) resolve to `None`.
    pub async fn category_id_by_slug(&self, slug: &str) -> Result<Option<String>, Error> {
        let url = self.url(&format!("categories/slug/{slug}"))?;
        debug!(slug, "resolving category");
        let resp = self.send(self.get(url)).await?;
        let body = match self.json_body(resp, "Failed to fetch category").await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let category: Category = envelope::extract(&body, "category")?;
        Ok(Some(category.id))
    }
}
