// Address book endpoints
//
// All routes are customer-scoped: `/customers/{customerId}/addresses`.
// The customer id is validated before any request goes out.

use tracing::debug;

use crate::auth::require_customer_id;
use crate::client::StorefrontClient;
use crate::envelope;
use crate::error::Error;
use crate::models::{Address, AddressPayload};

impl StorefrontClient {
    fn addresses_path(customer_id: &str) -> String {
        format!("customers/{customer_id}/addresses")
    }

    /// List the customer's addresses.
    ///
    /// `GET /customers/{customerId}/addresses`
    pub async fn list_addresses(&self, customer_id: Option<&str>) -> Result<Vec<Address>, Error> {
        let customer_id = require_customer_id(customer_id)?;
        let url = self.url(&Self::addresses_path(customer_id))?;
        debug!(customer_id, "listing addresses");
        let resp = self.send(self.get(url)).await?;
        let body = self.json_body(resp, "Failed to fetch addresses").await?;
        envelope::extract(&body, "items")
    }

    /// Create an address.
    ///
    /// `POST /customers/{customerId}/addresses`
    pub async fn create_address(
        &self,
        customer_id: Option<&str>,
        payload: &AddressPayload,
    ) -> Result<Address, Error> {
        let customer_id = require_customer_id(customer_id)?;
        let url = self.url(&Self::addresses_path(customer_id))?;
        debug!(customer_id, "creating address");
        let resp = self.send(self.post(url, payload)).await?;
        let body = self.json_body(resp, "Failed to add address").await?;
        envelope::extract(&body, "address")
    }

    /// Apply a partial update to an address.
    ///
    /// `PUT /customers/{customerId}/addresses/{addressId}`
    pub async fn update_address(
        &self,
        customer_id: Option<&str>,
        address_id: &str,
        payload: &AddressPayload,
    ) -> Result<Address, Error> {
        let customer_id = require_customer_id(customer_id)?;
        let url = self.url(&format!(
            "{}/{address_id}",
            Self::addresses_path(customer_id)
        ))?;
        debug!(customer_id, address_id, "updating address");
        let resp = self.send(self.put(url, payload)).await?;
        let body = self.json_body(resp, "Failed to update address").await?;
        envelope::extract(&body, "address")
    }

    /// Delete an address.
    ///
    /// `DELETE /customers/{customerId}/addresses/{addressId}`
    pub async fn delete_address(
        &self,
        customer_id: Option<&str>,
        address_id: &str,
    ) -> Result<(), Error> {
        let customer_id = require_customer_id(customer_id)?;
        let url = self.url(&format!(
            "{}/{address_id}",
            Self::addresses_path(customer_id)
        ))?;
        debug!(customer_id, address_id, "deleting address");
        let resp = self.send(self.delete(url)).await?;
        self.expect_success(resp, "Failed to delete address").await
    }

    /// Flag one address as the default.
    ///
    /// A single `{ "isDefault": true }` update against `address_id`; other
    /// addresses are left to the backend.
    pub async fn set_default_address(
        &self,
        customer_id: Option<&str>,
        address_id: &str,
    ) -> Result<Address, Error> {
        self.update_address(customer_id, address_id, &AddressPayload::make_default())
            .await
    }
}
