//! Blocking API for the services client
//!
//! Provides synchronous wrappers for build scripts, provisioning tools and other
//! non-async contexts. Each call runs to completion, including every page of a list,
//! before returning.

use crate::client::{ServiceApi, ServicesClient};
use crate::models::{
    PluginConfigRecord, Service, ServicePluginConfig, ServiceQuery, ServiceRequest,
};
use crate::Result;
use kong_core::{Error, KongConfig};
use tokio::runtime::{Builder, Runtime};

/// Synchronous wrapper around a [`ServiceApi`] implementation.
///
/// The wrapper owns a current-thread Tokio runtime created once at construction. It must not
/// be used from inside an async context.
///
/// # Examples
/// ```ignore
/// use kong_core::KongConfig;
/// use kong_services::blocking::BlockingServicesClient;
/// use kong_services::ServiceRequest;
///
/// let client = BlockingServicesClient::connect(KongConfig::from_env()?)?;
/// let service = client.create(&ServiceRequest::new().with_name("billing").with_host("billing.internal"))?;
/// ```
pub struct BlockingServicesClient<A = ServicesClient> {
    api: A,
    runtime: Runtime,
}

impl BlockingServicesClient<ServicesClient> {
    /// Build a [`ServicesClient`] from the configuration and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the client or the runtime cannot be created.
    pub fn connect(config: KongConfig) -> Result<Self> {
        Self::new(ServicesClient::new(config)?)
    }
}

impl<A: ServiceApi> BlockingServicesClient<A> {
    /// Wrap an existing implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the runtime cannot be created.
    pub fn new(api: A) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create tokio runtime: {e}")))?;
        Ok(Self { api, runtime })
    }

    /// Borrow the wrapped implementation.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Blocking [`ServicesClient::create`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::create`].
    pub fn create(&self, request: &ServiceRequest) -> Result<Service> {
        self.runtime.block_on(self.api.create(request))
    }

    /// Blocking [`ServicesClient::get_by_id`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::get_by_id`].
    pub fn get_by_id(&self, id: &str) -> Result<Option<Service>> {
        self.runtime.block_on(self.api.get_by_id(id))
    }

    /// Blocking [`ServicesClient::get_by_name`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::get_by_name`].
    pub fn get_by_name(&self, name: &str) -> Result<Option<Service>> {
        self.runtime.block_on(self.api.get_by_name(name))
    }

    /// Blocking [`ServicesClient::get_from_route_id`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::get_from_route_id`].
    pub fn get_from_route_id(&self, route_id: &str) -> Result<Option<Service>> {
        self.runtime.block_on(self.api.get_from_route_id(route_id))
    }

    /// Blocking [`ServicesClient::list`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::list`].
    pub fn list(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        self.runtime.block_on(self.api.list(query))
    }

    /// Blocking [`ServicesClient::update_by_id`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::update_by_id`].
    pub fn update_by_id(&self, id: &str, request: &ServiceRequest) -> Result<Service> {
        self.runtime.block_on(self.api.update_by_id(id, request))
    }

    /// Blocking [`ServicesClient::update_by_name`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::update_by_name`].
    pub fn update_by_name(&self, name: &str, request: &ServiceRequest) -> Result<Service> {
        self.runtime.block_on(self.api.update_by_name(name, request))
    }

    /// Blocking [`ServicesClient::update_from_route_id`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::update_from_route_id`].
    pub fn update_from_route_id(
        &self,
        route_id: &str,
        request: &ServiceRequest,
    ) -> Result<Service> {
        self.runtime
            .block_on(self.api.update_from_route_id(route_id, request))
    }

    /// Blocking [`ServicesClient::delete_by_id`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::delete_by_id`].
    pub fn delete_by_id(&self, id: &str) -> Result<()> {
        self.runtime.block_on(self.api.delete_by_id(id))
    }

    /// Blocking [`ServicesClient::delete_by_name`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::delete_by_name`].
    pub fn delete_by_name(&self, name: &str) -> Result<()> {
        self.runtime.block_on(self.api.delete_by_name(name))
    }

    /// Blocking [`ServicesClient::create_plugin_config`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::create_plugin_config`].
    pub fn create_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        config: &str,
    ) -> Result<ServicePluginConfig> {
        self.runtime
            .block_on(self.api.create_plugin_config(service_id, plugin_name, config))
    }

    /// Blocking [`ServicesClient::get_plugin_config`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::get_plugin_config`].
    pub fn get_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<Option<ServicePluginConfig>> {
        self.runtime
            .block_on(self.api.get_plugin_config(service_id, plugin_name, id))
    }

    /// Blocking [`ServicesClient::list_plugin_configs`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::list_plugin_configs`].
    pub fn list_plugin_configs(
        &self,
        service_id: &str,
        plugin_name: &str,
    ) -> Result<Option<Vec<PluginConfigRecord>>> {
        self.runtime
            .block_on(self.api.list_plugin_configs(service_id, plugin_name))
    }

    /// Blocking [`ServicesClient::delete_plugin_config`].
    ///
    /// # Errors
    ///
    /// See [`ServicesClient::delete_plugin_config`].
    pub fn delete_plugin_config(
        &self,
        service_id: &str,
        plugin_name: &str,
        id: &str,
    ) -> Result<()> {
        self.runtime
            .block_on(self.api.delete_plugin_config(service_id, plugin_name, id))
    }
}

impl<A> std::fmt::Debug for BlockingServicesClient<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingServicesClient")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockServiceApi;
    use mockall::predicate::eq;
    use serde_json::json;

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..Service::default()
        }
    }

    #[test]
    fn create_runs_to_completion() {
        let mut api = MockServiceApi::new();
        api.expect_create()
            .withf(|request| request.name.as_deref() == Some("billing"))
            .times(1)
            .returning(|_| Ok(service("abc", "billing")));

        let client = BlockingServicesClient::new(api).unwrap();
        let created = client
            .create(&ServiceRequest::new().with_name("billing"))
            .unwrap();
        assert_eq!(created.id(), Some("abc"));
    }

    #[test]
    fn soft_not_found_is_preserved() {
        let mut api = MockServiceApi::new();
        api.expect_get_by_name()
            .withf(|name| name == "missing")
            .returning(|_| Ok(None));
        api.expect_get_from_route_id()
            .withf(|route_id| route_id == "route-1")
            .returning(|_| Ok(Some(service("abc", "billing"))));

        let client = BlockingServicesClient::new(api).unwrap();
        assert_eq!(client.get_by_name("missing").unwrap(), None);
        assert_eq!(
            client.get_from_route_id("route-1").unwrap(),
            Some(service("abc", "billing"))
        );
    }

    #[test]
    fn list_passes_query_through() {
        let mut api = MockServiceApi::new();
        api.expect_list()
            .with(eq(ServiceQuery::with_size(500)))
            .times(1)
            .returning(|_| Ok(vec![service("a", "one"), service("b", "two")]));

        let client = BlockingServicesClient::new(api).unwrap();
        let services = client.list(&ServiceQuery::with_size(500)).unwrap();
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn errors_are_returned_unchanged() {
        let mut api = MockServiceApi::new();
        api.expect_delete_by_id()
            .returning(|_| Err(Error::BadRequest("foreign key violation".into())));
        api.expect_update_by_id()
            .returning(|_, _| Err(Error::Unauthorized("denied".into())));

        let client = BlockingServicesClient::new(api).unwrap();
        assert_eq!(
            client.delete_by_id("abc").unwrap_err(),
            Error::BadRequest("foreign key violation".into())
        );
        assert!(client
            .update_by_id("abc", &ServiceRequest::new())
            .unwrap_err()
            .is_unauthorized());
    }

    #[test]
    fn plugin_config_calls_are_forwarded() {
        let mut api = MockServiceApi::new();
        api.expect_create_plugin_config()
            .withf(|service_id, plugin, config| {
                service_id == "abc" && plugin == "key-auth" && config == r#"{"key":"k"}"#
            })
            .returning(|_, _, config| {
                Ok(ServicePluginConfig {
                    id: "p1".into(),
                    service: None,
                    body: config.to_string(),
                })
            });
        api.expect_list_plugin_configs().returning(|_, _| {
            let record = json!({"id": "p1"}).as_object().cloned().unwrap_or_default();
            Ok(Some(vec![record]))
        });
        api.expect_get_plugin_config().returning(|_, _, _| Ok(None));
        api.expect_delete_plugin_config()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let client = BlockingServicesClient::new(api).unwrap();
        let created = client
            .create_plugin_config("abc", "key-auth", r#"{"key":"k"}"#)
            .unwrap();
        assert_eq!(created.body, r#"{"key":"k"}"#);
        assert_eq!(
            client
                .list_plugin_configs("abc", "key-auth")
                .unwrap()
                .unwrap()
                .len(),
            1
        );
        assert!(client
            .get_plugin_config("abc", "key-auth", "p2")
            .unwrap()
            .is_none());
        client.delete_plugin_config("abc", "key-auth", "p1").unwrap();
    }

    #[test]
    fn connect_rejects_unreadable_ca() {
        let config = KongConfig::new("https://kong.example.com")
            .unwrap()
            .with_ca_cert("/nonexistent/ca.pem".into());
        let err = BlockingServicesClient::connect(config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
