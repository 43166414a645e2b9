//! Configuration structures for Cherry Servers clients.
//!
//! This module provides the settings every [`crate::client::ApiClient`] is
//! built from: API endpoint, credentials, user agent and request timeout.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default Cherry Servers API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.cherryservers.com/v1/";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "CHERRY_AUTH_TOKEN";

/// Environment variable overriding the API endpoint.
pub const API_URL_ENV: &str = "CHERRY_API_URL";

/// Environment variable holding the User-Agent prefix.
pub const USER_AGENT_PREFIX_ENV: &str = "CHERRY_USER_AGENT_PREFIX";

/// Configuration for a Cherry Servers client instance.
#[derive(Debug, Validate)]
pub struct CherryClientConfig {
    /// API base URL
    #[validate(url)]
    pub api_url: String,

    /// API token, sent as a bearer credential
    pub token: SecretString,

    /// Prefix prepended to the User-Agent header, typically an application name
    pub user_agent_prefix: String,

    /// Default request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl CherryClientConfig {
    /// Create a new client configuration from an API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::ConfigError("API token must not be empty".to_string()));
        }

        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: SecretString::from(token),
            user_agent_prefix: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        })
    }

    /// Create a configuration from `CHERRY_AUTH_TOKEN`, `CHERRY_API_URL` and
    /// `CHERRY_USER_AGENT_PREFIX`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token variable is missing or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Error> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| Error::ConfigError(format!("missing {TOKEN_ENV} environment variable")))?;
        let mut config = Self::new(token)?;

        if let Ok(api_url) = std::env::var(API_URL_ENV) {
            config = config.with_api_url(api_url);
        }
        if let Ok(prefix) = std::env::var(USER_AGENT_PREFIX_ENV) {
            config = config.with_user_agent_prefix(prefix);
        }

        config.validated()
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the User-Agent prefix.
    #[must_use]
    pub fn with_user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = prefix.into();
        self
    }

    /// Set the default request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Run field validation, returning the configuration on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the failing fields.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(self)
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expose the token for building the authorization header.
    pub(crate) fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Parse the API URL, making sure relative paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        let mut raw = self.api_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }
}
