// storefront-api: Async Rust client for the storefront customer REST API

pub mod addresses;
pub mod auth;
pub mod catalog;
pub mod client;
pub mod customers;
pub mod envelope;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{DEVICE_ID_HEADER, GUEST_ID, LoginCredentials, is_customer_id};
pub use client::StorefrontClient;
pub use error::Error;
pub use models::{
    Address, AddressPayload, Customer, PageMeta, Product, ProductPage, ProductQuery, ProfileUpdate,
};
pub use transport::{TlsMode, TransportConfig};
