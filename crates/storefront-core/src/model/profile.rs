use serde::{Deserialize, Serialize};
use storefront_api::is_customer_id;

/// The signed-in customer.
///
/// Replaced wholesale whenever the profile is refetched; cleared on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub mobile: String,
}

impl UserProfile {
    /// Split `full_name` on whitespace: first word, then the rest joined by spaces.
    pub fn name_parts(&self) -> (String, String) {
        let mut words = self.full_name.split_whitespace();
        let first = words.next().unwrap_or_default().to_owned();
        let rest = words.collect::<Vec<_>>().join(" ");
        (first, rest)
    }
}

/// A user counts as signed in when present with a real (non-guest) id.
pub fn is_authenticated(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|u| is_customer_id(&u.id))
}
