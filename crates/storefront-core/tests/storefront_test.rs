#![allow(clippy::unwrap_used)]
// End-to-end tests for `Storefront` against a wiremock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storefront_api::{StorefrontClient, TransportConfig};
use storefront_core::storage::{AUTH_TOKEN_KEY, DEVICE_ID_KEY};
use storefront_core::{
    AddressDraft, AddressField, AddressPayload, CoreError, FormController, FormMode, FormState,
    LocalStorage, LoginCredentials, MemoryStorage, ProductFilters, ProfileDraft, ProfileField,
    QueryKey, Storefront, StorefrontConfig, SubmitOutcome, SubmitPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Storefront, Arc<MemoryStorage>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/v1", server.uri())).unwrap();
    let api = StorefrontClient::new(base_url, &TransportConfig::default()).unwrap();

    let storage = Arc::new(MemoryStorage::new());
    storage.set(DEVICE_ID_KEY, "device-test").unwrap();

    let storefront = Storefront::with_parts(StorefrontConfig::default(), api, storage.clone());
    (server, storefront, storage)
}

fn customer_json(name: &str) -> serde_json::Value {
    json!({ "data": { "customer": {
        "_id": "c1", "fullName": name, "email": "jw@example.com", "mobile": "9999999999"
    }}})
}

fn address_json(id: &str, line1: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "customerId": "c1",
        "label": "Home",
        "fullName": "J. Watson",
        "line1": line1,
        "city": "London",
        "state": "LDN",
        "pincode": "NW16XE",
        "country": "UK",
        "isDefault": false
    })
}

async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .and(header("X-Device-Id", "device-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer_json("John Watson")))
        .mount(server)
        .await;
}

async fn mount_addresses(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/c1/addresses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "items": [address_json("a1", "221B Baker St")] } }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn products_page(current: u32, total: u32) -> serde_json::Value {
    json!({ "data": {
        "items": [{ "_id": format!("p{current}"), "name": "Pendant", "price": 999.0 }],
        "meta": { "currentPage": current, "totalPages": total }
    }})
}

// ── Entity cache ────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_reads_issue_one_request() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    mount_addresses(&server, 1).await;

    let (a, b) = tokio::join!(storefront.addresses(), storefront.addresses());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a[0].line1, "221B Baker St");
    assert_eq!(a[0].country, "UK");
}

#[tokio::test]
async fn test_profile_unauthorized_is_no_user() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/guest/addresses"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(storefront.fetch_user_profile().await, None);
    assert_eq!(storefront.profile().await, None);
    assert!(!storefront.is_authenticated().await);

    let err = storefront.addresses().await.unwrap_err();
    assert!(err.is_unauthenticated(), "got {err:?}");
    assert!(storefront.current_customer_id().await.is_err());
}

#[tokio::test]
async fn test_profile_server_error_is_swallowed() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    assert_eq!(storefront.fetch_user_profile().await, None);
}

#[tokio::test]
async fn test_pagination_stops_at_total_pages() {
    let (server, storefront, _) = setup().await;
    for page in [1u32, 2] {
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("page", page.to_string()))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products_page(page, 2)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let filters = ProductFilters::default();
    let first = storefront.products_infinite(&filters).await.unwrap();
    assert!(first.has_more());

    let both = storefront.fetch_next_products_page(&filters).await.unwrap();
    assert_eq!(both.page_count(), 2);
    assert!(!both.has_more());

    // No third request: the server said page 2 of 2.
    let still = storefront.fetch_next_products_page(&filters).await.unwrap();
    assert_eq!(still.page_count(), 2);
    assert_eq!(still.items().len(), 2);
}

#[tokio::test]
async fn test_next_page_on_invalidated_list_restarts_from_first_page() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 3)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(2, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let filters = ProductFilters::default();
    storefront.products_infinite(&filters).await.unwrap();
    storefront.store().invalidate(&QueryKey::products());

    let pages = storefront.fetch_next_products_page(&filters).await.unwrap();
    assert_eq!(pages.page_count(), 1);
    assert!(pages.has_more());
    assert_eq!(pages.items()[0].id, "p1");
}

#[tokio::test]
async fn test_jewelry_set_resolves_member_categories() {
    let (server, storefront, _) = setup().await;
    for (slug, id) in [("pendant", "k1"), ("earring", "k2"), ("necklace", "k4")] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/categories/slug/{slug}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "_id": id } })),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/slug/bracelet"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("categoryId", "k1,k2,k4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products_page(1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let pages = storefront
        .products_by_category("jewelry-set", &ProductFilters::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pages.items()[0].id, "p1");
}

#[tokio::test]
async fn test_unknown_category_disables_product_query() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories/slug/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = storefront
        .products_by_category("nope", &ProductFilters::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

// ── Mutation coordinator ────────────────────────────────────────────

#[tokio::test]
async fn test_address_mutation_invalidates_addresses_and_profile() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    mount_addresses(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customers/c1/addresses"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": { "address": address_json("a2", "1 Main St") } })),
        )
        .mount(&server)
        .await;

    storefront.addresses().await.unwrap();
    let policies = storefront.config().queries;
    let store = storefront.store();
    assert!(!store.addresses().is_stale(&QueryKey::addresses(), &policies.addresses));
    assert!(!store.profile().is_stale(&QueryKey::profile(), &policies.profile));

    let created = storefront
        .create_address(AddressPayload {
            line1: Some("1 Main St".into()),
            ..AddressPayload::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, "a2");

    // Both keys are stale by the time the mutation returns.
    assert!(store.addresses().is_stale(&QueryKey::addresses(), &policies.addresses));
    assert!(store.profile().is_stale(&QueryKey::profile(), &policies.profile));

    // The next read goes back to the server (second of two expected calls).
    storefront.addresses().await.unwrap();
}

#[tokio::test]
async fn test_failed_mutation_leaves_cache_untouched() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    mount_addresses(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/customers/c1/addresses/a1"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Address in use" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    storefront.addresses().await.unwrap();
    let err = storefront.delete_address("a1").await.unwrap_err();
    assert_eq!(err.to_string(), "Address in use");

    let policies = storefront.config().queries;
    assert!(
        !storefront
            .store()
            .addresses()
            .is_stale(&QueryKey::addresses(), &policies.addresses)
    );
    assert_eq!(storefront.cached_addresses().unwrap().len(), 1);
}

#[tokio::test]
async fn test_set_default_sends_single_update() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/c1/addresses/a2"))
        .and(body_json(json!({ "isDefault": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "address": address_json("a2", "1 Main St") } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    storefront.set_default_address("a2").await.unwrap();

    let puts = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.to_string() == "PUT")
        .count();
    assert_eq!(puts, 1);
}

#[tokio::test]
async fn test_login_sets_profile_and_stores_token() {
    let (server, storefront, storage) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customers/login"))
        .and(header("X-Device-Id", "device-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": "jwt-abc" } })),
        )
        .mount(&server)
        .await;
    mount_me(&server).await;

    let user = storefront
        .login(LoginCredentials {
            mobile: "9999999999".into(),
            otp: "123456".to_string().into(),
        })
        .await
        .unwrap();

    assert_eq!(user.full_name, "John Watson");
    assert_eq!(storefront.cached_profile().unwrap().id, "c1");
    assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn test_login_without_session_fails() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customers/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = storefront
        .login(LoginCredentials {
            mobile: "9999999999".into(),
            otp: "000000".to_string().into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Login succeeded but user fetch failed");
}

#[tokio::test]
async fn test_logout_is_local_and_clears_session() {
    let (server, storefront, storage) = setup().await;
    mount_me(&server).await;
    mount_addresses(&server, 1).await;
    storage.set(AUTH_TOKEN_KEY, "jwt-abc").unwrap();

    storefront.addresses().await.unwrap();
    let requests_before = server.received_requests().await.unwrap().len();
    let mut navigation = storefront.navigation();

    storefront.logout().await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), requests_before);
    assert_eq!(navigation.recv().await.unwrap().path, "/");
    assert_eq!(storage.get(AUTH_TOKEN_KEY).unwrap(), None);
    assert_eq!(storefront.cached_profile(), None);
    assert!(storefront.cached_addresses().is_none());
    // "No user" is a cached answer, not a missing one.
    assert_eq!(storefront.profile().await, None);
    assert_eq!(server.received_requests().await.unwrap().len(), requests_before);
}

#[tokio::test]
async fn test_address_fetch_in_flight_at_logout_is_not_cached() {
    let (server, storefront, storage) = setup().await;
    mount_me(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/c1/addresses"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "items": [address_json("a1", "Old user's home")] } }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    storage.set(AUTH_TOKEN_KEY, "jwt-abc").unwrap();

    let pending = {
        let storefront = storefront.clone();
        tokio::spawn(async move { storefront.addresses().await })
    };
    while !storefront
        .store()
        .addresses()
        .is_fetching(&QueryKey::addresses())
    {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    storefront.logout().await.unwrap();
    // Signed out: the read fails, leaving an empty entry behind.
    assert!(storefront.addresses().await.is_err());

    // The caller that asked before logout still gets its answer...
    assert_eq!(pending.await.unwrap().unwrap()[0].line1, "Old user's home");
    // ...but the next session never sees it.
    assert!(storefront.cached_addresses().is_none());
}

// ── Forms ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_edit_address_submit_sends_unchanged_payload() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    mount_addresses(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/c1/addresses/a1"))
        .and(body_json(json!({
            "fullName": "J. Watson",
            "line1": "221B Baker St",
            "city": "London",
            "state": "LDN",
            "pincode": "NW16XE",
            "country": "UK"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "address": address_json("a1", "221B Baker St") })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let addresses = storefront.addresses().await.unwrap();
    let mut form: FormController<AddressDraft> = FormController::new(SubmitPolicy::CloseOnSuccess);
    form.open(FormMode::Edit, addresses.first());

    let outcome = form.submit(&storefront).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Closed);
    assert_eq!(form.state(), FormState::Closed);
}

#[tokio::test]
async fn test_failed_submit_keeps_form_open_with_message() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/customers/c1/addresses"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Invalid pincode" })),
        )
        .mount(&server)
        .await;

    let mut form: FormController<AddressDraft> = FormController::new(SubmitPolicy::CloseOnSuccess);
    form.open(FormMode::Create, None);
    form.set_field(AddressField::Pincode, "bad").unwrap();

    let outcome = form.submit(&storefront).await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::KeptOpen {
            message: "Invalid pincode".into()
        }
    );
    assert_eq!(form.state(), FormState::Editing);
    assert_eq!(form.draft().unwrap().pincode, "bad");
}

#[tokio::test]
async fn test_close_immediately_policy_closes_before_mutation_settles() {
    let (server, storefront, _) = setup().await;
    mount_me(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(50)))
        .mount(&server)
        .await;

    let user = storefront.profile().await;
    let mut form: FormController<ProfileDraft> =
        FormController::new(SubmitPolicy::CloseImmediately);
    form.open(FormMode::Edit, user.as_ref());
    form.set_field(ProfileField::FirstName, "Jack").unwrap();

    let outcome = form.submit(&storefront).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Closed);
    assert!(!form.is_open());
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn test_profile_update_refetches_profile() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/me"))
        .and(body_json(json!({
            "fullName": "Jack Watson",
            "email": "jw@example.com",
            "mobile": "9999999999"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server).await;

    let user = storefront.profile().await;
    let mut form: FormController<ProfileDraft> = FormController::new(SubmitPolicy::CloseOnSuccess);
    form.open(FormMode::Edit, user.as_ref());
    form.set_field(ProfileField::FirstName, "Jack").unwrap();

    assert_eq!(form.submit(&storefront).await.unwrap(), SubmitOutcome::Closed);
    assert!(
        storefront
            .store()
            .profile()
            .is_stale(&QueryKey::profile(), &storefront.config().queries.profile)
    );
}

#[tokio::test]
async fn test_profile_update_marks_profile_stale_when_refetch_fails() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer_json("John Watson")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(storefront.profile().await.is_some());
    let policy = storefront.config().queries.profile;
    assert!(!storefront.store().profile().is_stale(&QueryKey::profile(), &policy));

    assert!(storefront.update_profile(Default::default()).await.is_err());
    assert!(storefront.store().profile().is_stale(&QueryKey::profile(), &policy));
}

#[tokio::test]
async fn test_unauthenticated_profile_update() {
    let (server, storefront, _) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = storefront
        .update_profile(Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthenticated { .. }));
    assert_eq!(err.to_string(), "Please sign in to update your profile");
}
