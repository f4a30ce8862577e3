//! Asynchronous client for Kong services and their plugin configurations.

use crate::models::{
    PluginConfigHeader, PluginConfigRecord, Service, ServicePage, ServicePluginConfig,
    ServicePluginConfigPage, ServiceQuery, ServiceRequest,
};
use crate::Result;
use async_trait::async_trait;
use kong_core::client::{decode_body, AdminClient, AdminClientBuilder, ClientConfig};
use kong_core::pagination::Paginated;
use kong_core::{classify, Error, KongConfig, StatusPolicy};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("kong-services/", env!("CARGO_PKG_VERSION"));

// `/services/`
const SERVICES_PATH: [&str; 2] = ["services", ""];

fn service_path(id_or_name: &str) -> [&str; 2] {
    ["services", id_or_name]
}

fn route_service_path(route_id: &str) -> [&str; 3] {
    ["routes", route_id, "service"]
}

fn plugin_collection_path<'a>(service_id: &'a str, plugin_name: &'a str) -> [&'a str; 3] {
    ["services", service_id, plugin_name]
}

fn plugin_item_path<'a>(
    service_id: &'a str,
    plugin_name: &'a str,
    id: &'a str,
) -> [&'a str; 4] {
    ["services", service_id, plugin_name, id]
}

/// Builder for [`ServicesClient`].
#[derive(Debug, Clone)]
pub struct ServicesClientBuilder {
    inner: AdminClientBuilder,
}

impl ServicesClientBuilder {
    /// Create a builder from the admin API configuration.
    #[must_use]
    pub fn new(config: KongConfig) -> Self {
        let builder = AdminClientBuilder::new(config).with_user_agent(USER_AGENT);
        Self { inner: builder }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner = self.inner.with_user_agent(user_agent);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// See [`AdminClientBuilder::build`].
    pub fn build(self) -> Result<ServicesClient> {
        let inner = self.inner.build()?;
        Ok(ServicesClient { inner })
    }
}

/// Asynchronous client for the `/services` resource.
///
/// Holds only immutable configuration, so a clone can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct ServicesClient {
    inner: AdminClient,
}

impl ServicesClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`AdminClientBuilder::build`].
    pub fn new(config: KongConfig) -> Result<Self> {
        ServicesClientBuilder::new(config).build()
    }

    /// Wrap an existing transport.
    #[must_use]
    pub fn from_admin_client(inner: AdminClient) -> Self {
        Self { inner }
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Register a new service.
    ///
    /// Unset port, retries and timeouts are filled in with
    /// [`ServiceRequest::with_defaults`] before sending.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] or [`Error::BadRequest`] when Kong rejects the call, and
    /// [`Error::OperationFailed`] when the response carries no service identifier.
    pub async fn create(&self, request: &ServiceRequest) -> Result<Service> {
        let request = request.clone().with_defaults();
        let body = self
            .exchange(
                Method::POST,
                &SERVICES_PATH,
                &[],
                StatusPolicy::AuthorizationAndBadRequest,
                json_payload(&request),
            )
            .await?;

        let service: Service = decode_body(&body)?;
        if !service.exists() {
            return Err(Error::operation_failed("register the service", body));
        }
        Ok(service)
    }

    /// Fetch a service by identifier. Returns `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`], [`Error::Transport`] or [`Error::Decode`].
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Service>> {
        self.get_service(&service_path(id)).await
    }

    /// Fetch a service by name. Returns `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::get_by_id`].
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Service>> {
        self.get_by_id(name).await
    }

    /// Fetch the service a route points at.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::get_by_id`].
    pub async fn get_from_route_id(&self, route_id: &str) -> Result<Option<Service>> {
        self.get_service(&route_service_path(route_id)).await
    }

    /// List every service, following the `next` cursor until the last page.
    ///
    /// The page size is clamped into [100, 1000]. A failure on any page discards the
    /// services collected so far.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`], [`Error::Transport`] or [`Error::Decode`] from any page.
    pub async fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        let mut query = query.normalized();
        let mut services = Vec::new();
        let mut pages = 0_usize;

        loop {
            let page = self.list_page(&query).await?;
            pages += 1;
            debug!(
                page = pages,
                items = page.data.len(),
                offset = query.offset.as_str(),
                "fetched services page"
            );

            // an empty cursor would silently restart from the first page
            let next_offset = if page.has_more() {
                page.offset()
                    .filter(|offset| !offset.is_empty())
                    .map(str::to_string)
            } else {
                None
            };
            services.extend(page.items());

            match next_offset {
                Some(offset) => query.offset = offset,
                None => break,
            }
        }

        Ok(services)
    }

    /// Fetch a single page of services without following the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::list`].
    pub async fn list_page(&self, query: &ServiceQuery) -> Result<ServicePage> {
        let query = query.normalized();
        let body = self
            .exchange(
                Method::GET,
                &SERVICES_PATH,
                &query.to_pairs(),
                StatusPolicy::Authorization,
                no_payload,
            )
            .await?;
        decode_body(&body)
    }

    /// Partially update a service by identifier; unset attributes are left unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] or [`Error::BadRequest`] when Kong rejects the call, and
    /// [`Error::OperationFailed`] when the response carries no service identifier.
    pub async fn update_by_id(&self, id: &str, request: &ServiceRequest) -> Result<Service> {
        self.update_service(&service_path(id), request).await
    }

    /// Partially update a service by name.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::update_by_id`].
    pub async fn update_by_name(&self, name: &str, request: &ServiceRequest) -> Result<Service> {
        self.update_by_id(name, request).await
    }

    /// Partially update the service a route points at.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::update_by_id`].
    pub async fn update_from_route_id(
        &self,
        route_id: &str,
        request: &ServiceRequest,
    ) -> Result<Service> {
        self.update_service(&route_service_path(route_id), request)
            .await
    }

    /// Delete a service by identifier.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] when the service is still referenced, e.g. by a route, carrying
    /// Kong's message verbatim. [`Error::Unauthorized`] or [`Error::Transport`] otherwise.
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.exchange(
            Method::DELETE,
            &service_path(id),
            &[],
            StatusPolicy::AuthorizationAndBadRequest,
            no_payload,
        )
        .await
        .map(|_| ())
    }

    /// Delete a service by name.
    ///
    /// # Errors
    ///
    /// Same as [`ServicesClient::delete_by_id`].
    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        self.delete_by_id(name).await
    }

    /// Attach a plugin configuration to a service.
    ///
    /// `config` is sent unchanged as the JSON payload.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] when Kong rejects the credentials and
    /// [`Error::OperationFailed`] when the response carries no identifier.
    pub async fn create_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        config: &str,
    ) -> Result<ServicePluginConfig> {
        let payload = config.to_string();
        let body = self
            .exchange(
                Method::POST,
                &plugin_collection_path(service_id, plugin_name),
                &[],
                StatusPolicy::Authorization,
                |request| {
                    request
                        .header("Content-Type", "application/json")
                        .body(payload)
                },
            )
            .await?;

        let header: PluginConfigHeader = decode_body(&body)?;
        let outcome = header.with_body(body.clone());
        outcome.ok_or_else(|| Error::operation_failed("create service plugin config", body))
    }

    /// Fetch one plugin configuration. Returns `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`], [`Error::Transport`] or [`Error::Decode`].
    pub async fn get_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<Option<ServicePluginConfig>> {
        let body = self
            .exchange(
                Method::GET,
                &plugin_item_path(service_id, plugin_name, id),
                &[],
                StatusPolicy::Authorization,
                no_payload,
            )
            .await?;

        let header: PluginConfigHeader = decode_body(&body)?;
        Ok(header.with_body(body))
    }

    /// List the configurations of one plugin on a service.
    ///
    /// Only the first page is fetched. Returns `None` rather than an empty list when nothing
    /// is configured.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`], [`Error::Transport`] or [`Error::Decode`].
    pub async fn list_plugin_configs(
        &self,
        service_id: &str,
        plugin_name: &str,
    ) -> Result<Option<Vec<PluginConfigRecord>>> {
        let body = self
            .exchange(
                Method::GET,
                &plugin_collection_path(service_id, plugin_name),
                &[],
                StatusPolicy::Authorization,
                no_payload,
            )
            .await?;

        let page: ServicePluginConfigPage = decode_body(&body)?;
        let records = page.items();
        Ok((!records.is_empty()).then_some(records))
    }

    /// Delete one plugin configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] or [`Error::Transport`].
    pub async fn delete_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<()> {
        self.exchange(
            Method::DELETE,
            &plugin_item_path(service_id, plugin_name, id),
            &[],
            StatusPolicy::Authorization,
            no_payload,
        )
        .await
        .map(|_| ())
    }

    async fn get_service(&self, path: &[&str]) -> Result<Option<Service>> {
        let body = self
            .exchange(Method::GET, path, &[], StatusPolicy::Authorization, no_payload)
            .await?;

        let service: Service = decode_body(&body)?;
        Ok(service.exists().then_some(service))
    }

    async fn update_service(&self, path: &[&str], request: &ServiceRequest) -> Result<Service> {
        let body = self
            .exchange(
                Method::PATCH,
                path,
                &[],
                StatusPolicy::AuthorizationAndBadRequest,
                json_payload(request),
            )
            .await?;

        let service: Service = decode_body(&body)?;
        if !service.exists() {
            return Err(Error::operation_failed("update service", body));
        }
        Ok(service)
    }

    async fn exchange<F>(
        &self,
        method: Method,
        path: &[&str],
        params: &[(&'static str, String)],
        policy: StatusPolicy,
        configure: F,
    ) -> Result<String>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let response = self
            .inner
            .execute(method, path, params, |request| {
                configure(request.header("Accept", "application/json"))
            })
            .await?;

        let status = response.status;
        classify(status, response.body, policy).map_err(|err| {
            if err.is_unauthorized() {
                warn!(
                    path = ?path,
                    status = status.as_u16(),
                    "Kong rejected the admin credentials"
                );
            }
            err
        })
    }
}

fn no_payload(request: RequestBuilder) -> RequestBuilder {
    request
}

fn json_payload<B>(body: &B) -> impl FnOnce(RequestBuilder) -> RequestBuilder + '_
where
    B: Serialize + ?Sized,
{
    move |request| request.json(body)
}

/// Operations on Kong services, implemented by [`ServicesClient`].
///
/// Code that only needs to talk to services can depend on this trait and substitute a test
/// double for the HTTP client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceApi: Send + Sync {
    /// See [`ServicesClient::create`].
    async fn create(&self, request: &ServiceRequest) -> Result<Service>;
    /// See [`ServicesClient::get_by_id`].
    async fn get_by_id(&self, id: &str) -> Result<Option<Service>>;
    /// See [`ServicesClient::get_by_name`].
    async fn get_by_name(&self, name: &str) -> Result<Option<Service>>;
    /// See [`ServicesClient::get_from_route_id`].
    async fn get_from_route_id(&self, route_id: &str) -> Result<Option<Service>>;
    /// See [`ServicesClient::list`].
    async fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>>;
    /// See [`ServicesClient::update_by_id`].
    async fn update_by_id(&self, id: &str, request: &ServiceRequest) -> Result<Service>;
    /// See [`ServicesClient::update_by_name`].
    async fn update_by_name(&self, name: &str, request: &ServiceRequest) -> Result<Service>;
    /// See [`ServicesClient::update_from_route_id`].
    async fn update_from_route_id(
        &self,
        route_id: &str,
        request: &ServiceRequest,
    ) -> Result<Service>;
    /// See [`ServicesClient::delete_by_id`].
    async fn delete_by_id(&self, id: &str) -> Result<()>;
    /// See [`ServicesClient::delete_by_name`].
    async fn delete_by_name(&self, name: &str) -> Result<()>;
    /// See [`ServicesClient::create_plugin_config`].
    async fn create_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        config: &str,
    ) -> Result<ServicePluginConfig>;
    /// See [`ServicesClient::get_plugin_config`].
    async fn get_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<Option<ServicePluginConfig>>;
    /// See [`ServicesClient::list_plugin_configs`].
    async fn list_plugin_configs(
        &self,
        service_id: &str,
        plugin_name: &str,
    ) -> Result<Option<Vec<PluginConfigRecord>>>;
    /// See [`ServicesClient::delete_plugin_config`].
    async fn delete_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<()>;
}

#[async_trait]
impl ServiceApi for ServicesClient {
    async fn create(&self, request: &ServiceRequest) -> Result<Service> {
        ServicesClient::create(self, request).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Service>> {
        ServicesClient::get_by_id(self, id).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Service>> {
        ServicesClient::get_by_name(self, name).await
    }

    async fn get_from_route_id(&self, route_id: &str) -> Result<Option<Service>> {
        ServicesClient::get_from_route_id(self, route_id).await
    }

    async fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        ServicesClient::list(self, query).await
    }

    async fn update_by_id(&self, id: &str, request: &ServiceRequest) -> Result<Service> {
        ServicesClient::update_by_id(self, id, request).await
    }

    async fn update_by_name(&self, name: &str, request: &ServiceRequest) -> Result<Service> {
        ServicesClient::update_by_name(self, name, request).await
    }

    async fn update_from_route_id(
        &self,
        route_id: &str,
        request: &ServiceRequest,
    ) -> Result<Service> {
        ServicesClient::update_from_route_id(self, route_id, request).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        ServicesClient::delete_by_id(self, id).await
    }

    async fn delete_by_name(&self, name: &str) -> Result<()> {
        ServicesClient::delete_by_name(self, name).await
    }

    async fn create_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        config: &str,
    ) -> Result<ServicePluginConfig> {
        ServicesClient::create_plugin_config(self, service_id, plugin_name, config).await
    }

    async fn get_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<Option<ServicePluginConfig>> {
        ServicesClient::get_plugin_config(self, service_id, plugin_name, id).await
    }

    async fn list_plugin_configs(
        &self,
        service_id: &str,
        plugin_name: &str,
    ) -> Result<Option<Vec<PluginConfigRecord>>> {
        ServicesClient::list_plugin_configs(self, service_id, plugin_name).await
    }

    async fn delete_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<()> {
        ServicesClient::delete_plugin_config(self, service_id, plugin_name, id).await
    }
}
