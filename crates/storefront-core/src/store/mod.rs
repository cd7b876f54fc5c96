// ── Entity cache ──
//
// Keyed, invalidatable query results with in-flight deduplication and
// generation-checked commits.

mod data_store;
mod key;
mod pages;
mod query_cache;

pub use data_store::DataStore;
pub use key::QueryKey;
pub use pages::{Page, Pages};
pub use query_cache::QueryCache;
