use serde::Deserialize;
use std::env;
use std::fmt;

use crate::config::settings::SettingsConfig;
use crate::error::ExchangeError;
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_UPSTREAM_BASE_URL};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// ================================
/// Upstream student API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }

    /// `<base_url>/api/<path>`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn token_url(&self) -> String {
        self.api_url("token")
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

/// ================================
/// Client credentials
/// ================================
/// Names of the environment variables holding the OAuth2 client secrets.
/// Values are read at call time and never stored in config.
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,
    #[serde(default = "default_redirect_uri_env")]
    pub redirect_uri_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            redirect_uri_env: default_redirect_uri_env(),
        }
    }
}

impl CredentialsConfig {
    pub fn client(&self) -> Result<ClientCredentials, ExchangeError> {
        Ok(ClientCredentials {
            client_id: read_env(&self.client_id_env)?,
            client_secret: read_env(&self.client_secret_env)?,
        })
    }

    pub fn redirect_uri(&self) -> Result<String, ExchangeError> {
        read_env(&self.redirect_uri_env)
    }
}

pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

fn read_env(name: &str) -> Result<String, ExchangeError> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ExchangeError::MissingCredential(name.to_owned()))
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_client_id_env() -> String {
    "ID".to_string()
}

fn default_client_secret_env() -> String {
    "SECRET".to_string()
}

fn default_redirect_uri_env() -> String {
    "REDIRECT".to_string()
}
