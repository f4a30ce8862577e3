//! HTTP transport for the Kong Admin API.
//!
//! [`AdminClient`] sends exactly one request per call and hands back the status and raw body.
//! It never retries and imposes no timeout unless one is configured; classification and
//! decoding are left to the resource clients.

use crate::config::KongConfig;
use crate::error::{Error, Result};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

const USER_AGENT: &str = concat!("kong-core/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
///
/// Tunes the connection pool and, optionally, a per-request timeout. There is no retry
/// policy: a failed exchange is reported to the caller immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Optional request timeout, none by default
    pub timeout: Option<Duration>,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`AdminClient`].
#[derive(Debug, Clone)]
pub struct AdminClientBuilder {
    config: KongConfig,
    http_config: ClientConfig,
    user_agent: String,
}

impl AdminClientBuilder {
    /// Create a builder from a [`KongConfig`].
    #[must_use]
    pub fn new(config: KongConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin address is invalid, the CA certificate cannot be loaded
    /// or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<AdminClient> {
        let base_url = self.config.parse_host_address()?;

        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression);

        if let Some(timeout) = self.http_config.timeout {
            builder = builder.timeout(timeout);
        }

        if self.config.tls_skip_verify {
            warn!("TLS verification disabled for Kong admin client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.config.tls_ca_cert {
            debug!("loading Kong CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::Config(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::Config(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        let basic_auth = self
            .config
            .username
            .clone()
            .map(|user| (user, self.config.password.clone()));

        Ok(AdminClient {
            http,
            base_url,
            basic_auth,
            api_key: self.config.api_key,
            admin_token: self.config.admin_token,
        })
    }
}

/// Status and body of one admin API exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body, verbatim
    pub body: String,
}

/// Parse a raw body as JSON.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the body does not match `T`.
pub fn decode_body<T>(body: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(Error::from)
}

/// Single-shot HTTP client bound to one Kong admin address and set of credentials.
#[derive(Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    basic_auth: Option<(String, Option<SecretString>)>,
    api_key: Option<SecretString>,
    admin_token: Option<SecretString>,
}

impl AdminClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`AdminClientBuilder::build`].
    pub fn new(config: KongConfig) -> Result<Self> {
        AdminClientBuilder::new(config).build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve admin API path segments, e.g. `["services", "abc"]`, against the base address.
    ///
    /// Segments are appended after any base path prefix and percent-encoded, so a `/`, `?` or
    /// `#` inside a name stays part of that segment. A trailing empty segment yields a
    /// trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the base address cannot carry a path.
    pub fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidEndpoint(format!(
                    "Admin address `{}` cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request to the resolved `segments` and collect the status and raw body.
    ///
    /// `configure` may attach a payload or extra headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the request cannot be sent or the body cannot be read.
    pub async fn execute<F>(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&'static str, String)],
        configure: F,
    ) -> Result<RawResponse>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.build_url(segments)?;
        let path = url.path().to_string();
        let mut request = self.http.request(method.clone(), url);

        if !params.is_empty() {
            request = request.query(params);
        }
        request = self.authenticate(request);
        request = configure(request);

        let response = request.send().await.map_err(Error::from)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::from)?;

        info!(%method, path = path.as_str(), status = status.as_u16(), "Kong admin request");

        Ok(RawResponse { status, body })
    }

    fn authenticate(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, password.as_ref().map(|p| p.expose_secret()));
        }
        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key.expose_secret());
        }
        if let Some(token) = &self.admin_token {
            request = request.header("kong-admin-token", token.expose_secret());
        }
        request
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url.as_str())
            .field("basic_auth", &self.basic_auth.is_some())
            .field("api_key", &self.api_key.is_some())
            .field("admin_token", &self.admin_token.is_some())
            .finish()
    }
}
