use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Country assumed when the backend omits one.
pub const DEFAULT_COUNTRY: &str = "India";

/// A saved delivery address.
///
/// At most one address per customer should carry `is_default`; the client
/// never enforces that itself, it only ever flips the flag on one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub customer_id: String,
    pub label: String,
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Address {
    /// Two display lines: street (`line1, line2`) and `city, state, pincode`.
    pub fn formatted(&self) -> FormattedAddress {
        format_address_from_backend(
            &self.line1,
            self.line2.as_deref(),
            Some(&self.city),
            Some(&self.state),
            Some(&self.pincode),
        )
    }
}

/// Display form of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAddress {
    pub address: String,
    pub city_zip: String,
}

/// Backend fields recovered from the display form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendAddressParts {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Join the non-empty street parts and the non-empty locality parts with `", "`.
pub fn format_address_from_backend(
    line1: &str,
    line2: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    pincode: Option<&str>,
) -> FormattedAddress {
    let join = |parts: &[Option<&str>]| {
        parts
            .iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    };

    FormattedAddress {
        address: join(&[Some(line1), line2]),
        city_zip: join(&[city, state, pincode]),
    }
}

/// Inverse of [`format_address_from_backend`].
///
/// Splits both strings on commas and trims. The pincode is the third
/// locality part, or the last one when fewer than three are present.
pub fn parse_address_to_backend(address: &str, city_zip: &str) -> BackendAddressParts {
    let split = |s: &str| s.split(',').map(str::trim).map(String::from).collect::<Vec<_>>();
    let street = split(address);
    let locality = split(city_zip);
    let part = |parts: &[String], idx: usize| parts.get(idx).cloned().unwrap_or_default();

    let pincode = locality
        .get(2)
        .filter(|p| !p.is_empty())
        .or_else(|| locality.last())
        .cloned()
        .unwrap_or_default();

    BackendAddressParts {
        line1: part(&street, 0),
        line2: part(&street, 1),
        city: part(&locality, 0),
        state: part(&locality, 1),
        pincode,
    }
}
