// ── API-to-domain type conversions ──
//
// Bridges raw `storefront_api` response types into canonical
// `storefront_core::model` types, filling defaults for missing data.

use storefront_api::models as wire;

use crate::model::{Address, DEFAULT_COUNTRY, UserProfile};

// ── Helpers ────────────────────────────────────────────────────────

/// Treat blank strings as absent.
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Customer ───────────────────────────────────────────────────────

impl From<wire::Customer> for UserProfile {
    fn from(c: wire::Customer) -> Self {
        Self {
            id: c.id,
            full_name: c.full_name,
            email: non_blank(c.email),
            mobile: c.mobile,
        }
    }
}

// ── Address ────────────────────────────────────────────────────────

impl From<wire::Address> for Address {
    fn from(a: wire::Address) -> Self {
        Self {
            id: a.id,
            customer_id: a.customer_id,
            label: a.label,
            full_name: a.full_name,
            line1: a.line1,
            line2: non_blank(a.line2),
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            country: non_blank(a.country).unwrap_or_else(|| DEFAULT_COUNTRY.to_owned()),
            is_default: a.is_default,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
