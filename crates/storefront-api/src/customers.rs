// Customer / auth-service endpoints
//
// `GET /customers/me` doubles as the session probe: 401/403 mean "no
// session", not failure. These calls carry the `X-Device-Id` header.

use reqwest::StatusCode;
use tracing::debug;

use crate::auth::{LoginCredentials, is_customer_id};
use crate::client::StorefrontClient;
use crate::envelope;
use crate::error::Error;
use crate::models::{Customer, LoginToken, ProfileUpdate};

impl StorefrontClient {
    /// Fetch the signed-in customer.
    ///
    /// `GET /customers/me`. Returns `Ok(None)` for 401/403, for bodies
    /// without a customer id, and for the guest sentinel.
    pub async fn me(&self) -> Result<Option<Customer>, Error> {
        let url = self.url("customers/me")?;
        let resp = self.send(self.with_device(self.get(url))).await?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            debug!(status = %resp.status(), "no session");
            return Ok(None);
        }

        let body = self.json_body(resp, "Failed to fetch user profile").await?;
        let customer: Customer = envelope::extract(&body, "customer")?;
        Ok(is_customer_id(&customer.id).then_some(customer))
    }

    /// Update the signed-in customer's profile.
    ///
    /// `PUT /customers/me` with a partial body. The response body is not
    /// trusted as the new profile; callers re-read via [`me`](Self::me).
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), Error> {
        let url = self.url("customers/me")?;
        debug!(?update, "updating profile");
        let resp = self.send(self.with_device(self.put(url, update))).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthenticated {
                message: "Please sign in to update your profile".into(),
            });
        }
        self.expect_success(resp, "Failed to update profile").await
    }

    /// Log in with mobile + OTP.
    ///
    /// `POST /customers/login`. The session cookie lands in the jar; a
    /// token in the body (`data.token` / `token`) is returned if present.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Option<String>, Error> {
        let url = self.url("customers/login")?;
        debug!(mobile = %credentials.mobile, "logging in");
        let resp = self
            .send(self.with_device(self.post(url, &credentials.body())))
            .await?;

        let body = self.json_body(resp, "Login failed").await?;
        let token = envelope::extract_root::<LoginToken>(&body, "login")
            .ok()
            .and_then(|t| t.token)
            .or_else(|| body.get("token").and_then(|t| t.as_str()).map(String::from));
        Ok(token)
    }
}
