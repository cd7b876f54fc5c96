// ── Domain model ──
//
// Canonical in-memory shapes for server-owned entities. Wire types from
// storefront-api are normalized into these by `crate::convert`.

pub mod address;
pub mod catalog;
pub mod profile;

pub use address::{
    Address, BackendAddressParts, DEFAULT_COUNTRY, FormattedAddress, format_address_from_backend,
    parse_address_to_backend,
};
pub use catalog::{
    JEWELRY_SET_SLUG, JEWELRY_SET_SLUGS, PageMeta, Product, ProductFilters, ProductPage,
    expand_category_slug,
};
pub use profile::{UserProfile, is_authenticated};
