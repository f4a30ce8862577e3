//! Service and plugin-config models for the Kong Admin API.
//!
//! Every attribute is an `Option` so that "not set" and "set to the default value" stay
//! distinct. Absent attributes are left out of request payloads entirely.

use chrono::{DateTime, Utc};
use kong_core::pagination::{PageQuery, Paginated};
use kong_core::{Id, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Port injected on create when the request leaves it unset.
pub const DEFAULT_PORT: u16 = 80;
/// Retry count injected on create when the request leaves it unset.
pub const DEFAULT_RETRIES: u32 = 5;
/// Connect/read/write timeout (milliseconds) injected on create when unset.
pub const DEFAULT_TIMEOUT_MS: u32 = 60_000;

/// Query for listing services.
pub type ServiceQuery = PageQuery;

/// Schema-free plugin configuration record.
pub type PluginConfigRecord = serde_json::Map<String, serde_json::Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Write-side representation of a service, used for create and partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRequest {
    /// Service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Upstream protocol (`http`, `https`, `grpc`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Upstream host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Upstream port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Path used in upstream requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of proxy retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Upstream connect timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u32>,
    /// Upstream write timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<u32>,
    /// Upstream read timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u32>,
    /// Shorthand setting protocol, host, port and path at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tags.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl ServiceRequest {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the retry count.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set the connect timeout (ms).
    #[must_use]
    pub fn with_connect_timeout(mut self, millis: u32) -> Self {
        self.connect_timeout = Some(millis);
        self
    }

    /// Set the write timeout (ms).
    #[must_use]
    pub fn with_write_timeout(mut self, millis: u32) -> Self {
        self.write_timeout = Some(millis);
        self
    }

    /// Set the read timeout (ms).
    #[must_use]
    pub fn with_read_timeout(mut self, millis: u32) -> Self {
        self.read_timeout = Some(millis);
        self
    }

    /// Set the URL shorthand.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Fill unset port, retries and timeouts with the values used on create.
    ///
    /// Attributes the caller already set, including explicit zeros, are kept.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.port.get_or_insert(DEFAULT_PORT);
        self.retries.get_or_insert(DEFAULT_RETRIES);
        self.connect_timeout.get_or_insert(DEFAULT_TIMEOUT_MS);
        self.read_timeout.get_or_insert(DEFAULT_TIMEOUT_MS);
        self.write_timeout.get_or_insert(DEFAULT_TIMEOUT_MS);
        self
    }
}

/// Representation of a service as returned by the admin API.
///
/// A decoded service without an `id` means the admin API found nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Creation timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Service name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Upstream protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Upstream host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Upstream port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Upstream path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Number of proxy retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Upstream connect timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u32>,
    /// Upstream write timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout: Option<u32>,
    /// Upstream read timeout (ms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<u32>,
    /// URL shorthand, when echoed by the admin API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tags.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl Service {
    /// Returns the identifier, if the admin API assigned one.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns true when the decoded body actually described a service.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

/// One page of `GET /services/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServicePage {
    /// Services on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Service>,
    /// Link to the next page; absent or empty on the last page.
    #[serde(default)]
    pub next: Option<String>,
    /// Cursor to echo back for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl Paginated for ServicePage {
    type Item = Service;

    fn items(self) -> Vec<Service> {
        self.data
    }

    fn next_link(&self) -> Option<&str> {
        self.next.as_deref()
    }

    fn offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }
}

/// Plugin configuration attached to a service.
///
/// Only the identifier and owning service are parsed; the full response is kept in `body`
/// because each plugin has its own schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePluginConfig {
    /// Identifier of the configuration.
    pub id: String,
    /// Service the configuration is attached to, when the admin API reports it.
    pub service: Option<Id>,
    /// Raw response body.
    pub body: String,
}

impl ServicePluginConfig {
    /// Parse the raw body into an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`kong_core::Error::Decode`] if the body is not JSON.
    pub fn value(&self) -> Result<serde_json::Value> {
        self.parse()
    }

    /// Parse the raw body into a plugin-specific type.
    ///
    /// # Errors
    ///
    /// Returns [`kong_core::Error::Decode`] if the body does not match `T`.
    pub fn parse<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        kong_core::client::decode_body(&self.body)
    }
}

/// The parsed part of a plugin configuration response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PluginConfigHeader {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    service: Option<Id>,
}

impl PluginConfigHeader {
    /// Attach the raw body, or return `None` when the identifier is missing or empty.
    pub(crate) fn with_body(self, body: String) -> Option<ServicePluginConfig> {
        let id = self.id.filter(|id| !id.is_empty())?;
        Some(ServicePluginConfig {
            id,
            service: self.service,
            body,
        })
    }
}

/// One page of plugin configurations for a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServicePluginConfigPage {
    /// Untyped configuration records.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<PluginConfigRecord>,
    /// Link to the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Cursor to echo back for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl Paginated for ServicePluginConfigPage {
    type Item = PluginConfigRecord;

    fn items(self) -> Vec<PluginConfigRecord> {
        self.data
    }

    fn next_link(&self) -> Option<&str> {
        self.next.as_deref()
    }

    fn offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }
}
