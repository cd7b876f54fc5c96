// ── Storefront facade ──
//
// Ties the gateway client, the entity cache, local storage, and command
// routing together. Reads go through the typed caches; writes go through
// `execute`, which invalidates affected keys only after the write succeeds.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, join_all};
use storefront_api::{
    AddressPayload, LoginCredentials, ProductQuery, ProfileUpdate, StorefrontClient,
    TransportConfig,
};
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, info, warn};

use crate::command::{Command, CommandResult};
use crate::config::{QueryPolicy, StorefrontConfig};
use crate::error::CoreError;
use crate::model::{
    Address, Product, ProductFilters, ProductPage, UserProfile, expand_category_slug,
    is_authenticated,
};
use crate::storage::{
    AUTH_TOKEN_KEY, FileStorage, LocalStorage, MemoryStorage, device_id, generate_device_id,
};
use crate::store::{DataStore, Page, Pages, QueryCache, QueryKey};

const NAVIGATION_CHANNEL_SIZE: usize = 16;

const SIGN_IN_FOR_ADDRESSES: &str = "Please sign in to manage addresses";

/// Navigation side effect requested by the data layer (e.g. after logout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
}

type Fetcher<T> =
    Box<dyn Fn(Option<Arc<T>>) -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

// ── Storefront ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<StorefrontInner>`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: StorefrontClient,
    /// Same client plus `X-Device-Id`; built on first auth-service call.
    auth_api: OnceCell<StorefrontClient>,
    storage: Arc<dyn LocalStorage>,
    store: Arc<DataStore>,
    navigation_tx: broadcast::Sender<Navigation>,
}

impl Storefront {
    /// Build a storefront from configuration: HTTP client with cookie jar
    /// and timeout, file-backed storage if a path is configured.
    pub fn new(config: StorefrontConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let api = StorefrontClient::new(config.api_url.clone(), &transport)?;
        let storage: Arc<dyn LocalStorage> = match &config.storage_path {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::with_parts(config, api, storage))
    }

    /// Build from pre-made parts. The client's own base URL wins over
    /// `config.api_url`.
    pub fn with_parts(
        config: StorefrontConfig,
        api: StorefrontClient,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        let (navigation_tx, _) = broadcast::channel(NAVIGATION_CHANNEL_SIZE);
        Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                auth_api: OnceCell::new(),
                storage,
                store: Arc::new(DataStore::new()),
                navigation_tx,
            }),
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.inner.storage
    }

    /// Subscribe to navigation requests.
    pub fn navigation(&self) -> broadcast::Receiver<Navigation> {
        self.inner.navigation_tx.subscribe()
    }

    /// Client for auth-service calls, carrying the persisted device id.
    ///
    /// Storage failures degrade to an unpersisted id rather than failing
    /// the request.
    async fn auth_client(&self) -> StorefrontClient {
        self.inner
            .auth_api
            .get_or_init(|| async {
                let id = device_id(self.inner.storage.as_ref()).unwrap_or_else(|e| {
                    warn!(error = %e, "device id not persisted");
                    generate_device_id()
                });
                self.inner.api.clone().with_device_id(id)
            })
            .await
            .clone()
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Probe the current session.
    ///
    /// Never fails: 401/403, guest sessions, and any error all resolve to
    /// `None`, so anonymous browsing never surfaces as a hard error.
    pub async fn fetch_user_profile(&self) -> Option<UserProfile> {
        probe_profile(&self.auth_client().await).await
    }

    /// Current user, from cache when fresh.
    pub async fn profile(&self) -> Option<UserProfile> {
        let client = self.auth_client().await;
        let fetcher: Fetcher<Option<UserProfile>> = Box::new(move |_| {
            let client = client.clone();
            async move { Ok(probe_profile(&client).await) }.boxed()
        });
        match self
            .inner
            .store
            .profile
            .ensure_fresh(&QueryKey::profile(), &self.inner.config.queries.profile, fetcher)
            .await
        {
            Ok(user) => (*user).clone(),
            Err(e) => {
                warn!(error = %e, "profile read failed");
                None
            }
        }
    }

    /// Cached profile without touching the network. `None` when never loaded
    /// or when the cache says nobody is signed in.
    pub fn cached_profile(&self) -> Option<UserProfile> {
        self.inner
            .store
            .profile
            .read(&QueryKey::profile())
            .and_then(|user| (*user).clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        is_authenticated(self.profile().await.as_ref())
    }

    /// Id of the signed-in customer, resolved through the profile cache.
    pub async fn current_customer_id(&self) -> Result<String, CoreError> {
        self.profile()
            .await
            .filter(|u| is_authenticated(Some(u)))
            .map(|u| u.id)
            .ok_or_else(|| CoreError::Unauthenticated {
                message: SIGN_IN_FOR_ADDRESSES.into(),
            })
    }

    // ── Addresses ────────────────────────────────────────────────────

    /// The customer's address book, from cache when fresh.
    pub async fn addresses(&self) -> Result<Arc<Vec<Address>>, CoreError> {
        self.inner
            .store
            .addresses
            .ensure_fresh(
                &QueryKey::addresses(),
                &self.inner.config.queries.addresses,
                self.address_fetcher(),
            )
            .await
    }

    /// Address book bypassing the staleness window.
    pub async fn refresh_addresses(&self) -> Result<Arc<Vec<Address>>, CoreError> {
        self.inner
            .store
            .addresses
            .refetch(
                &QueryKey::addresses(),
                &self.inner.config.queries.addresses,
                self.address_fetcher(),
            )
            .await
    }

    pub fn cached_addresses(&self) -> Option<Arc<Vec<Address>>> {
        self.inner.store.addresses.read(&QueryKey::addresses())
    }

    /// Whatever is cached now; a stale entry is refreshed in the background.
    pub fn peek_addresses(&self) -> Option<Arc<Vec<Address>>> {
        self.inner.store.addresses.read_and_revalidate(
            &QueryKey::addresses(),
            &self.inner.config.queries.addresses,
            self.address_fetcher(),
        )
    }

    fn address_fetcher(&self) -> Fetcher<Vec<Address>> {
        let this = self.clone();
        Box::new(move |_| {
            let this = this.clone();
            async move {
                let customer_id = this.customer_id().await;
                let addresses = this
                    .inner
                    .api
                    .list_addresses(customer_id.as_deref())
                    .await?;
                Ok(addresses.into_iter().map(Address::from).collect())
            }
            .boxed()
        })
    }

    async fn customer_id(&self) -> Option<String> {
        self.profile().await.map(|u| u.id)
    }

    // ── Catalog ──────────────────────────────────────────────────────

    /// One page of products matching `filters`.
    pub async fn products(
        &self,
        filters: &ProductFilters,
        page: u32,
    ) -> Result<Arc<ProductPage>, CoreError> {
        let client = self.inner.api.clone();
        let query = ProductQuery {
            page: Some(page),
            ..self.base_query(filters, Vec::new())
        };
        let fetcher: Fetcher<ProductPage> = Box::new(move |_| {
            let client = client.clone();
            let query = query.clone();
            async move { Ok(client.list_products(&query).await?) }.boxed()
        });
        self.inner
            .store
            .products
            .ensure_fresh(
                &QueryKey::product_list(filters, page),
                &self.inner.config.queries.products,
                fetcher,
            )
            .await
    }

    /// First page of an infinite product list. A stale list restarts at page 1.
    pub async fn products_infinite(
        &self,
        filters: &ProductFilters,
    ) -> Result<Arc<Pages<Product>>, CoreError> {
        let key = QueryKey::products_infinite(filters);
        self.first_page(&key, self.base_query(filters, Vec::new()))
            .await
    }

    /// Append the next page to the infinite list, if the server reports one.
    pub async fn fetch_next_products_page(
        &self,
        filters: &ProductFilters,
    ) -> Result<Arc<Pages<Product>>, CoreError> {
        let key = QueryKey::products_infinite(filters);
        self.next_page(&key, self.base_query(filters, Vec::new()))
            .await
    }

    /// Category ids a slug resolves to.
    ///
    /// `jewelry-set` expands to its member categories; members that fail to
    /// resolve are dropped.
    pub async fn category_ids(&self, slug: &str) -> Result<Arc<Vec<String>>, CoreError> {
        let client = self.inner.api.clone();
        let owned_slug = slug.to_owned();
        let fetcher: Fetcher<Vec<String>> = Box::new(move |_| {
            let client = client.clone();
            let slug = owned_slug.clone();
            async move { resolve_category_ids(&client, &slug).await }.boxed()
        });
        self.inner
            .store
            .category_ids
            .ensure_fresh(
                &QueryKey::category_ids(slug),
                &self.inner.config.queries.category_ids,
                fetcher,
            )
            .await
    }

    /// Infinite product list for a category. `None` while the category
    /// resolves to no ids: the query stays disabled.
    pub async fn products_by_category(
        &self,
        slug: &str,
        filters: &ProductFilters,
    ) -> Result<Option<Arc<Pages<Product>>>, CoreError> {
        let ids = self.category_ids(slug).await?;
        if ids.is_empty() {
            debug!(slug, "category resolved to no ids, query disabled");
            return Ok(None);
        }
        let key = QueryKey::products_by_category(slug, filters);
        self.first_page(&key, self.base_query(filters, ids.to_vec()))
            .await
            .map(Some)
    }

    pub async fn fetch_next_category_page(
        &self,
        slug: &str,
        filters: &ProductFilters,
    ) -> Result<Option<Arc<Pages<Product>>>, CoreError> {
        let ids = self.category_ids(slug).await?;
        if ids.is_empty() {
            return Ok(None);
        }
        let key = QueryKey::products_by_category(slug, filters);
        self.next_page(&key, self.base_query(filters, ids.to_vec()))
            .await
            .map(Some)
    }

    fn base_query(&self, filters: &ProductFilters, category_ids: Vec<String>) -> ProductQuery {
        ProductQuery {
            category_ids,
            min_price: filters.min_price,
            max_price: filters.max_price,
            search: filters.search.clone(),
            page: None,
            limit: Some(self.inner.config.page_size),
        }
    }

    fn pages_cache(&self) -> &QueryCache<Pages<Product>> {
        &self.inner.store.product_pages
    }

    fn products_policy(&self) -> &QueryPolicy {
        &self.inner.config.queries.products
    }

    async fn first_page(
        &self,
        key: &QueryKey,
        query: ProductQuery,
    ) -> Result<Arc<Pages<Product>>, CoreError> {
        let client = self.inner.api.clone();
        let fetcher: Fetcher<Pages<Product>> = Box::new(move |_| {
            let client = client.clone();
            let query = ProductQuery {
                page: Some(1),
                ..query.clone()
            };
            async move { Ok(Pages::first(fetch_page(&client, &query).await?)) }.boxed()
        });
        self.pages_cache()
            .ensure_fresh(key, self.products_policy(), fetcher)
            .await
    }

    async fn next_page(
        &self,
        key: &QueryKey,
        query: ProductQuery,
    ) -> Result<Arc<Pages<Product>>, CoreError> {
        let Some(current) = self.pages_cache().read(key) else {
            return self.first_page(key, query).await;
        };
        if self.pages_cache().is_stale(key, self.products_policy()) {
            debug!(%key, "list is stale, restarting from the first page");
            return self.first_page(key, query).await;
        }
        if !current.has_more() {
            debug!(%key, "no further pages");
            return Ok(current);
        }

        let client = self.inner.api.clone();
        let fetcher: Fetcher<Pages<Product>> = Box::new(move |previous| {
            let client = client.clone();
            let query = query.clone();
            async move {
                let previous = previous.map(|p| (*p).clone()).unwrap_or_default();
                let page = previous.next_cursor().unwrap_or(1);
                if previous.page_count() > 0 && !previous.has_more() {
                    return Ok(previous);
                }
                let next = fetch_page(
                    &client,
                    &ProductQuery {
                        page: Some(page),
                        ..query
                    },
                )
                .await?;
                Ok(previous.appended(next))
            }
            .boxed()
        });
        self.pages_cache()
            .refetch(key, self.products_policy(), fetcher)
            .await
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a write operation.
    ///
    /// On success every key the command could have changed is invalidated
    /// before this returns. On failure the cache is left untouched. Commands
    /// are never retried.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let name = cmd.name();
        let invalidates = cmd.invalidates();
        debug!(command = name, "executing");

        match self.route_command(cmd).await {
            Ok(result) => {
                self.inner.store.invalidate_all(&invalidates);
                info!(command = name, "command succeeded");
                Ok(result)
            }
            Err(e) => {
                warn!(command = name, error = %e, "command failed");
                Err(e)
            }
        }
    }

    async fn route_command(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let api = &self.inner.api;

        match cmd {
            // ── Address book ─────────────────────────────────────────
            Command::CreateAddress(payload) => {
                let customer_id = self.customer_id().await;
                let created = api
                    .create_address(customer_id.as_deref(), &payload)
                    .await?;
                Ok(CommandResult::Address(created.into()))
            }
            Command::UpdateAddress { id, update } => {
                let customer_id = self.customer_id().await;
                let updated = api
                    .update_address(customer_id.as_deref(), &id, &update)
                    .await?;
                Ok(CommandResult::Address(updated.into()))
            }
            Command::DeleteAddress { id } => {
                let customer_id = self.customer_id().await;
                api.delete_address(customer_id.as_deref(), &id).await?;
                Ok(CommandResult::Ok)
            }
            Command::SetDefaultAddress { id } => {
                let customer_id = self.customer_id().await;
                let updated = api
                    .set_default_address(customer_id.as_deref(), &id)
                    .await?;
                Ok(CommandResult::Address(updated.into()))
            }

            // ── Profile / session ────────────────────────────────────
            Command::UpdateProfile(update) => {
                let auth = self.auth_client().await;
                auth.update_profile(&update).await?;
                // The server has the change now, whatever the refetch does.
                self.inner.store.invalidate(&QueryKey::profile());
                let user = auth.me().await?.ok_or_else(|| CoreError::RequestFailed {
                    message: "Profile updated, but failed to fetch new profile".into(),
                    status: None,
                })?;
                Ok(CommandResult::Profile(user.into()))
            }
            Command::Login(credentials) => {
                let auth = self.auth_client().await;
                if let Some(token) = auth.login(&credentials).await? {
                    if let Err(e) = self.inner.storage.set(AUTH_TOKEN_KEY, &token) {
                        warn!(error = %e, "auth token not persisted");
                    }
                }
                let user: UserProfile = probe_profile(&auth)
                    .await
                    .ok_or_else(|| CoreError::RequestFailed {
                        message: "Login succeeded but user fetch failed".into(),
                        status: None,
                    })?;
                self.inner
                    .store
                    .profile
                    .set(&QueryKey::profile(), Some(user.clone()));
                Ok(CommandResult::Profile(user))
            }
            Command::Logout => {
                if let Err(e) = self.inner.storage.remove(AUTH_TOKEN_KEY) {
                    warn!(error = %e, "auth token not cleared");
                }
                self.inner.store.profile.set(&QueryKey::profile(), None);
                // The next user must never see the previous address book.
                self.inner.store.remove(&QueryKey::addresses());
                // No receivers is fine: nothing is rendering.
                let _ = self.inner.navigation_tx.send(Navigation { path: "/".into() });
                Ok(CommandResult::Ok)
            }
        }
    }

    // ── Command shortcuts ────────────────────────────────────────────

    pub async fn create_address(&self, payload: AddressPayload) -> Result<Address, CoreError> {
        expect_address(self.execute(Command::CreateAddress(payload)).await?)
    }

    pub async fn update_address(
        &self,
        id: impl Into<String>,
        update: AddressPayload,
    ) -> Result<Address, CoreError> {
        expect_address(
            self.execute(Command::UpdateAddress {
                id: id.into(),
                update,
            })
            .await?,
        )
    }

    pub async fn delete_address(&self, id: impl Into<String>) -> Result<(), CoreError> {
        self.execute(Command::DeleteAddress { id: id.into() })
            .await
            .map(|_| ())
    }

    pub async fn set_default_address(&self, id: impl Into<String>) -> Result<Address, CoreError> {
        expect_address(
            self.execute(Command::SetDefaultAddress { id: id.into() })
                .await?,
        )
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, CoreError> {
        expect_profile(self.execute(Command::UpdateProfile(update)).await?)
    }

    pub async fn login(&self, credentials: LoginCredentials) -> Result<UserProfile, CoreError> {
        expect_profile(self.execute(Command::Login(credentials)).await?)
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        self.execute(Command::Logout).await.map(|_| ())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn probe_profile(client: &StorefrontClient) -> Option<UserProfile> {
    match client.me().await {
        Ok(customer) => customer.map(UserProfile::from),
        Err(e) => {
            warn!(error = %e, "profile probe failed, treating as signed out");
            None
        }
    }
}

async fn fetch_page(
    client: &StorefrontClient,
    query: &ProductQuery,
) -> Result<Page<Product>, CoreError> {
    let page = client.list_products(query).await?;
    Ok(Page {
        items: page.items,
        meta: page.meta,
    })
}

async fn resolve_category_ids(
    client: &StorefrontClient,
    slug: &str,
) -> Result<Vec<String>, CoreError> {
    let slugs = expand_category_slug(slug);
    if let [single] = slugs.as_slice() {
        return Ok(client.category_id_by_slug(single).await?.into_iter().collect());
    }

    let lookups = join_all(slugs.iter().map(|s| client.category_id_by_slug(s))).await;
    Ok(lookups
        .into_iter()
        .zip(&slugs)
        .filter_map(|(result, member)| match result {
            Ok(id) => id,
            Err(e) => {
                warn!(slug = member, error = %e, "category lookup failed, skipping");
                None
            }
        })
        .collect())
}

fn expect_address(result: CommandResult) -> Result<Address, CoreError> {
    match result {
        CommandResult::Address(address) => Ok(address),
        other => Err(CoreError::Internal(format!(
            "expected address result, got {other:?}"
        ))),
    }
}

fn expect_profile(result: CommandResult) -> Result<UserProfile, CoreError> {
    match result {
        CommandResult::Profile(user) => Ok(user),
        other => Err(CoreError::Internal(format!(
            "expected profile result, got {other:?}"
        ))),
    }
}
