//! Client-side data synchronization between `storefront-api` and UI
//! consumers (CLI, apps).
//!
//! - **[`Storefront`]**: central facade. Reads go through typed caches with
//!   in-flight deduplication and stale-while-revalidate; writes go through
//!   [`Storefront::execute`], which invalidates affected keys on success.
//!
//! - **[`DataStore`]**: one [`QueryCache`] per payload type, keyed by
//!   [`QueryKey`]. Each fetch commits only under the generation it started
//!   in, so an invalidation always beats an older in-flight result.
//!
//! - **[`Command`]**: typed mutations (addresses, profile, login, logout).
//!
//! - **[`FormController`]**: per-modal lifecycle (`Closed`, `Initializing`,
//!   `Editing`, `Submitting`) owning an uncommitted [`Draft`].
//!
//! - **Local storage** ([`storage`]): device correlation id and auth token.

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod form;
pub mod model;
pub mod storage;
pub mod store;
pub mod storefront;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{
    DEFAULT_API_URL, DEFAULT_PAGE_SIZE, QueryPolicies, QueryPolicy, StorefrontConfig, SubmitPolicy,
};
pub use error::CoreError;
pub use form::{
    AddressDraft, AddressField, Draft, FormController, FormMode, FormState, ProfileDraft,
    ProfileField, SubmitOutcome, SubmitTicket,
};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use store::{DataStore, Page, Pages, QueryCache, QueryKey};
pub use storefront::{Navigation, Storefront};

pub use model::{
    Address, PageMeta, Product, ProductFilters, ProductPage, UserProfile, is_authenticated,
};

// Wire types callers need to build commands.
pub use storefront_api::{AddressPayload, LoginCredentials, ProfileUpdate};
