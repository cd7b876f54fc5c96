use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::Error;

/// Customer id the backend reports for anonymous sessions.
pub const GUEST_ID: &str = "guest";

/// Correlation header sent on auth-service calls.
pub const DEVICE_ID_HEADER: &str = "X-Device-Id";

/// Mobile + one-time-password pair for `POST /customers/login`.
///
/// The OTP never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub mobile: String,
    pub otp: SecretString,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    mobile: &'a str,
    otp: &'a str,
}

impl LoginCredentials {
    pub(crate) fn body(&self) -> LoginBody<'_> {
        LoginBody {
            mobile: &self.mobile,
            otp: self.otp.expose_secret(),
        }
    }
}

/// Returns `true` when `id` names a real customer (present, not the guest sentinel).
pub fn is_customer_id(id: &str) -> bool {
    !id.is_empty() && id != GUEST_ID
}

/// Fail fast with [`Error::Unauthenticated`] unless `id` names a real customer.
///
/// Address endpoints are customer-scoped; issuing them for a guest would
/// only ever produce a backend rejection.
pub fn require_customer_id(id: Option<&str>) -> Result<&str, Error> {
    match id {
        Some(id) if is_customer_id(id) => Ok(id),
        _ => Err(Error::Unauthenticated {
            message: "Please sign in to manage addresses".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_is_not_a_customer() {
        assert!(!is_customer_id(GUEST_ID));
        assert!(!is_customer_id(""));
        assert!(is_customer_id("64f0c1"));
    }

    #[test]
    fn require_customer_id_rejects_guest_and_missing() {
        assert!(matches!(
            require_customer_id(Some("guest")),
            Err(Error::Unauthenticated { .. })
        ));
        assert!(matches!(
            require_customer_id(None),
            Err(Error::Unauthenticated { .. })
        ));
        assert_eq!(require_customer_id(Some("c1")).ok(), Some("c1"));
    }
}
