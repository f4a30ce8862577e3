//! Configuration for Kong Admin API clients.
//!
//! A [`KongConfig`] holds the admin address and credentials. It is validated once, handed to
//! a client builder and never mutated afterwards, so every operation on a client sees the same
//! settings.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;
use validator::Validate;

/// Default admin API address used when none is configured.
pub const DEFAULT_ADMIN_ADDRESS: &str = "http://localhost:8001";

/// Environment variable holding the admin API address.
pub const ENV_ADMIN_ADDR: &str = "KONG_ADMIN_ADDR";
/// Environment variable holding the basic-auth username.
pub const ENV_ADMIN_USERNAME: &str = "KONG_ADMIN_USERNAME";
/// Environment variable holding the basic-auth password.
pub const ENV_ADMIN_PASSWORD: &str = "KONG_ADMIN_PASSWORD";
/// Environment variable holding the key-auth API key.
pub const ENV_API_KEY: &str = "KONG_API_KEY";
/// Environment variable holding the RBAC admin token.
pub const ENV_ADMIN_TOKEN: &str = "KONG_ADMIN_TOKEN";
/// Environment variable toggling TLS verification off.
pub const ENV_TLS_SKIP_VERIFY: &str = "TLS_SKIP_VERIFY";
/// Environment variable holding a PEM CA bundle path.
pub const ENV_CA_CERT_PATH: &str = "KONG_CA_CERT_PATH";

/// Connection settings for a Kong Admin API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KongConfig {
    /// Admin API base URL, e.g. `http://localhost:8001`
    #[validate(url)]
    #[serde(default = "default_host_address")]
    pub host_address: String,

    /// Basic-auth username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub password: Option<SecretString>,

    /// Key-auth credential, sent as the `apikey` header
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub api_key: Option<SecretString>,

    /// RBAC token, sent as the `kong-admin-token` header
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub admin_token: Option<SecretString>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub tls_skip_verify: bool,

    /// Optional path to a custom CA certificate (PEM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,
}

fn default_host_address() -> String {
    DEFAULT_ADMIN_ADDRESS.to_string()
}

fn serialize_secret<S>(_secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("****")
}

impl KongConfig {
    /// Create a configuration for the given admin address.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(host_address: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            host_address: host_address.into(),
            ..Self::default()
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Build a configuration from the `KONG_*` environment variables.
    ///
    /// Unset variables fall back to [`KongConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or `TLS_SKIP_VERIFY` is not a boolean.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`KongConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_address = lookup(ENV_ADMIN_ADDR).unwrap_or_else(default_host_address);
        let mut config = Self::new(host_address)?;

        config.username = lookup(ENV_ADMIN_USERNAME);
        config.password = lookup(ENV_ADMIN_PASSWORD).map(SecretString::from);
        config.api_key = lookup(ENV_API_KEY).map(SecretString::from);
        config.admin_token = lookup(ENV_ADMIN_TOKEN).map(SecretString::from);
        config.tls_ca_cert = lookup(ENV_CA_CERT_PATH).map(PathBuf::from);

        if let Some(raw) = lookup(ENV_TLS_SKIP_VERIFY) {
            config.tls_skip_verify = raw.trim().parse::<bool>().map_err(|_| {
                Error::Config(format!("{ENV_TLS_SKIP_VERIFY} must be true or false, got `{raw}`"))
            })?;
        }

        Ok(config)
    }

    /// Set HTTP basic-auth credentials.
    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the key-auth API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the RBAC admin token.
    #[must_use]
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set whether to skip TLS certificate verification.
    #[must_use]
    pub const fn with_tls_skip_verify(mut self, skip: bool) -> Self {
        self.tls_skip_verify = skip;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Parse and validate the admin address.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_host_address(&self) -> Result<Url, Error> {
        Url::parse(&self.host_address)
            .map_err(|e| Error::Config(format!("Invalid admin address: {e}")))
    }
}

impl Default for KongConfig {
    fn default() -> Self {
        Self {
            host_address: default_host_address(),
            username: None,
            password: None,
            api_key: None,
            admin_token: None,
            tls_skip_verify: false,
            tls_ca_cert: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_kong_config_new() {
        let config = KongConfig::new("https://kong.example.com:8444").unwrap();
        assert_eq!(config.host_address, "https://kong.example.com:8444");
        assert!(!config.tls_skip_verify);
        assert!(config.username.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_kong_config_invalid_url() {
        let result = KongConfig::new("not-a-url");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_kong_config_builder() {
        let config = KongConfig::new("https://kong.example.com")
            .unwrap()
            .with_basic_auth("admin", "s3cret")
            .with_api_key("key-1")
            .with_admin_token("token-1")
            .with_tls_skip_verify(true);

        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.password.as_ref().unwrap().expose_secret(), "s3cret");
        assert_eq!(config.api_key.as_ref().unwrap().expose_secret(), "key-1");
        assert_eq!(
            config.admin_token.as_ref().unwrap().expose_secret(),
            "token-1"
        );
        assert!(config.tls_skip_verify);
    }

    #[test]
    fn test_kong_config_default() {
        let config = KongConfig::default();
        assert_eq!(config.host_address, DEFAULT_ADMIN_ADDRESS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_host_address() {
        let config = KongConfig::new("https://kong.example.com:8444").unwrap();
        let url = config.parse_host_address().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("kong.example.com"));
        assert_eq!(url.port(), Some(8444));
    }

    #[test]
    fn from_lookup_uses_defaults_when_unset() {
        let config = KongConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host_address, DEFAULT_ADMIN_ADDRESS);
        assert!(config.password.is_none());
        assert!(!config.tls_skip_verify);
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = KongConfig::from_lookup(lookup_from(&[
            (ENV_ADMIN_ADDR, "http://kong:8001"),
            (ENV_ADMIN_USERNAME, "admin"),
            (ENV_ADMIN_PASSWORD, "pw"),
            (ENV_API_KEY, "apikey-1"),
            (ENV_ADMIN_TOKEN, "rbac-1"),
            (ENV_TLS_SKIP_VERIFY, "true"),
            (ENV_CA_CERT_PATH, "/etc/kong/ca.pem"),
        ]))
        .unwrap();

        assert_eq!(config.host_address, "http://kong:8001");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.password.unwrap().expose_secret(), "pw");
        assert_eq!(config.api_key.unwrap().expose_secret(), "apikey-1");
        assert_eq!(config.admin_token.unwrap().expose_secret(), "rbac-1");
        assert!(config.tls_skip_verify);
        assert_eq!(config.tls_ca_cert, Some(PathBuf::from("/etc/kong/ca.pem")));
    }

    #[test]
    fn from_lookup_rejects_bad_tls_flag() {
        let result = KongConfig::from_lookup(lookup_from(&[(ENV_TLS_SKIP_VERIFY, "maybe")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn from_lookup_rejects_bad_address() {
        let result = KongConfig::from_lookup(lookup_from(&[(ENV_ADMIN_ADDR, "kong")]));
        assert!(result.is_err());
    }

    #[test]
    fn secrets_are_masked_when_serialized() {
        let config = KongConfig::new("http://kong:8001")
            .unwrap()
            .with_basic_auth("admin", "hunter2")
            .with_api_key("abc");

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("\"abc\""));
        assert!(json.contains("****"));
        assert!(!json.contains("admin_token"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: KongConfig =
            serde_json::from_str(r#"{"api_key":"abc","tls_skip_verify":true}"#).unwrap();
        assert_eq!(config.host_address, DEFAULT_ADMIN_ADDRESS);
        assert_eq!(config.api_key.unwrap().expose_secret(), "abc");
        assert!(config.tls_skip_verify);
    }
}
