//! HTTP transport for the Cherry Servers API.
//!
//! [`ApiClient`] performs exactly one authenticated HTTP call per request and
//! never retries: a non-success status, a connection failure or a timeout is
//! returned to the caller as-is. Requests are described by the immutable
//! [`ApiRequest`] and answered with [`ApiResponse`].

use crate::config::CherryClientConfig;
use crate::query::QueryParams;
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// Per-resource request timeouts (in seconds)

/// Default timeout for server requests (create and actions are slow)
pub const SERVERS_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for IP address requests
pub const IPS_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for block storage requests
pub const BLOCK_STORAGES_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for backup storage requests
pub const BACKUP_STORAGES_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for team requests
pub const TEAMS_DEFAULT_TIMEOUT: u64 = 15;

/// Default timeout for plan requests
pub const PLANS_DEFAULT_TIMEOUT: u64 = 10;

/// Default timeout for project requests
pub const PROJECTS_DEFAULT_TIMEOUT: u64 = 5;

/// Default timeout for region requests
pub const REGIONS_DEFAULT_TIMEOUT: u64 = 5;

/// Default timeout for SSH key requests
pub const SSH_KEYS_DEFAULT_TIMEOUT: u64 = 5;

/// Default timeout for image requests
pub const IMAGES_DEFAULT_TIMEOUT: u64 = 5;

/// Default timeout for user requests
pub const USERS_DEFAULT_TIMEOUT: u64 = 5;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

const LIBRARY: &str = concat!("cherry-rust/", env!("CARGO_PKG_VERSION"));
// Release series of the HTTP engine, not its patch version. Bump together
// with the workspace `reqwest` requirement.
const HTTP_ENGINE: &str = "reqwest/0.12";

/// HTTP engine configuration.
///
/// Tunes the underlying connection pool; request timeouts live on the
/// requests themselves.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// TCP connect timeout
    pub connect_timeout: Duration,

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
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
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

/// An outbound API call.
///
/// The body is present exactly when the method is POST, PUT or PATCH; the
/// constructors enforce this.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    params: QueryParams,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    /// Build a request from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMethod`] for verbs outside GET, POST, PUT,
    /// PATCH and DELETE, and [`Error::InvalidRequest`] when the presence of
    /// `body` does not match the verb.
    pub fn new(method: Method, path: impl Into<String>, body: Option<String>) -> Result<Self> {
        let path = path.into();
        let wants_body = method_carries_body(&method)?;

        match (wants_body, body.is_some()) {
            (true, false) => Err(Error::InvalidRequest(format!(
                "{method} {path} requires a request body"
            ))),
            (false, true) => Err(Error::InvalidRequest(format!(
                "{method} {path} must not carry a request body"
            ))),
            _ => Ok(Self {
                method,
                path,
                params: QueryParams::new(),
                body,
                timeout: None,
            }),
        }
    }

    /// A GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::without_body(Method::GET, path.into())
    }

    /// A DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::without_body(Method::DELETE, path.into())
    }

    /// A POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body cannot be serialized.
    pub fn post<B>(path: impl Into<String>, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        Self::new(Method::POST, path, Some(serde_json::to_string(body)?))
    }

    /// A PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body cannot be serialized.
    pub fn put<B>(path: impl Into<String>, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        Self::new(Method::PUT, path, Some(serde_json::to_string(body)?))
    }

    /// A PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body cannot be serialized.
    pub fn patch<B>(path: impl Into<String>, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        Self::new(Method::PATCH, path, Some(serde_json::to_string(body)?))
    }

    fn without_body(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            params: QueryParams::new(),
            body: None,
            timeout: None,
        }
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Override the client's default timeout for this request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Serialized JSON body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Per-request timeout, if overridden.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

fn method_carries_body(method: &Method) -> Result<bool> {
    if *method == Method::GET || *method == Method::DELETE {
        Ok(false)
    } else if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
        Ok(true)
    } else {
        Err(Error::InvalidMethod(method.to_string()))
    }
}

/// A successful API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

#[derive(Deserialize)]
struct CreatedId<T> {
    id: T,
}

impl ApiResponse {
    /// Status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Validate the body into a model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body does not fit `T`.
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.body)
            .map_err(|err| Error::Validation(format!("Failed to parse API response: {err}")))
    }

    /// Extract the `id` field of a resource returned by a create or update call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the body has no usable `id`.
    pub fn resource_id<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.json::<CreatedId<T>>().map(|created| created.id)
    }
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    config: CherryClientConfig,
    http_config: ClientConfig,
}

impl ApiClientBuilder {
    /// Create a builder from a [`CherryClientConfig`].
    #[must_use]
    pub fn new(config: CherryClientConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new(),
        }
    }

    /// Override the HTTP engine configuration.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid or the
    /// HTTP engine cannot be initialised.
    pub fn build(self) -> Result<ApiClient> {
        let config = self.config.validated()?;
        let base_url = config.parse_api_url()?;
        let user_agent = user_agent(&config.user_agent_prefix);

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.token()))
            .map_err(|_| Error::ConfigError("API token contains invalid characters".to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = ClientBuilder::new()
            .user_agent(user_agent.clone())
            .default_headers(headers)
            .connect_timeout(self.http_config.connect_timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression)
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ApiClient {
            http,
            base_url,
            user_agent,
            default_timeout: config.timeout(),
        })
    }
}

fn user_agent(prefix: &str) -> String {
    format!("{prefix}/{LIBRARY} {HTTP_ENGINE}")
}

/// Authenticated Cherry Servers API client.
///
/// Headers are fixed at construction. Cloning is cheap and shares the
/// connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    user_agent: String,
    default_timeout: Duration,
}

impl ApiClient {
    /// Construct a client for the default endpoint from an API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        ApiClientBuilder::new(CherryClientConfig::new(token)?).build()
    }

    /// Start a builder from the provided configuration.
    #[must_use]
    pub fn builder(config: CherryClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the User-Agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Timeout applied to requests that do not set their own.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }

    /// Perform one HTTP call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpStatus`] for non-2xx responses and
    /// [`Error::Network`] or [`Error::RequestTimeout`] for transport failures.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.build_url(request.path())?;
        let timeout = request.timeout().unwrap_or(self.default_timeout);
        let method = request.method().clone();

        debug!(
            %method,
            path = %request.path(),
            params = ?request.params().as_pairs(),
            ?timeout,
            "Sending Cherry Servers API request"
        );

        let mut builder = self.http.request(method.clone(), url).timeout(timeout);
        if !request.params().is_empty() {
            builder = builder.query(request.params().as_pairs());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).into_owned();
            warn!(
                %method,
                path = %request.path,
                status = status.as_u16(),
                "Cherry Servers API returned an error status"
            );
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get(
        &self,
        path: &str,
        params: Option<QueryParams>,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let request = ApiRequest::get(path)
            .with_params(params.unwrap_or_default())
            .with_timeout(timeout);
        self.execute(request).await
    }

    /// POST `body` to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
        params: Option<QueryParams>,
        timeout: Duration,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::post(path, body)?
            .with_params(params.unwrap_or_default())
            .with_timeout(timeout);
        self.execute(request).await
    }

    /// PUT `body` to `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn put<B>(
        &self,
        path: &str,
        body: &B,
        params: Option<QueryParams>,
        timeout: Duration,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::put(path, body)?
            .with_params(params.unwrap_or_default())
            .with_timeout(timeout);
        self.execute(request).await
    }

    /// PATCH `path` with `body`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn patch<B>(
        &self,
        path: &str,
        body: &B,
        params: Option<QueryParams>,
        timeout: Duration,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::patch(path, body)?
            .with_params(params.unwrap_or_default())
            .with_timeout(timeout);
        self.execute(request).await
    }

    /// DELETE `path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete(
        &self,
        path: &str,
        params: Option<QueryParams>,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let request = ApiRequest::delete(path)
            .with_params(params.unwrap_or_default())
            .with_timeout(timeout);
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn test_client(server: &MockServer) -> ApiClient {
        let config = CherryClientConfig::new("test_token")
            .unwrap()
            .with_api_url(format!("{}/v1/", server.uri()))
            .with_user_agent_prefix("test");
        ApiClient::builder(config).build().unwrap()
    }

    #[test]
    fn test_user_agent_with_prefix() {
        assert_eq!(
            user_agent("test"),
            format!("test/cherry-rust/{} {HTTP_ENGINE}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_user_agent_without_prefix() {
        assert_eq!(
            user_agent(""),
            format!("/cherry-rust/{} {HTTP_ENGINE}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_request_rejects_unsupported_method() {
        let err = ApiRequest::new(Method::HEAD, "servers/1", None).unwrap_err();
        assert_eq!(err, Error::InvalidMethod("HEAD".to_string()));

        let err = ApiRequest::new(Method::OPTIONS, "servers/1", None).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)));
    }

    #[test]
    fn test_request_body_invariant() {
        assert!(matches!(
            ApiRequest::new(Method::GET, "servers/1", Some("{}".to_string())),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            ApiRequest::new(Method::DELETE, "servers/1", Some("{}".to_string())),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            ApiRequest::new(Method::PUT, "servers/1", None),
            Err(Error::InvalidRequest(_))
        ));

        let request = ApiRequest::new(Method::PATCH, "servers/1", Some("{}".to_string())).unwrap();
        assert_eq!(request.body(), Some("{}"));
        assert!(ApiRequest::get("servers/1").body().is_none());
        assert!(ApiRequest::delete("servers/1").body().is_none());
    }

    #[test]
    fn test_request_serializes_body() {
        let request = ApiRequest::post("teams", &json!({"name": "team"})).unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.body(), Some("{\"name\":\"team\"}"));
        assert_eq!(request.timeout(), None);

        let request = request.with_timeout(TIMEOUT);
        assert_eq!(request.timeout(), Some(TIMEOUT));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = CherryClientConfig::new("token").unwrap().with_timeout(0);
        let err = ApiClient::builder(config).build().unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_default_headers() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        Mock::given(method("GET"))
            .and(path("/v1/user"))
            .and(header("authorization", "Bearer test_token"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", client.user_agent()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client.get("user", None, TIMEOUT).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_with_params() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/ssh-keys"))
            .and(query_param("fields", "ssh_key,user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .get(
                "ssh-keys",
                Some(QueryParams::fields(&["ssh_key", "user"])),
                TIMEOUT,
            )
            .await
            .unwrap();
        let keys: Vec<serde_json::Value> = response.json().unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_get_not_found_is_http_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/servers/1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get("servers/1", None, TIMEOUT).await.unwrap_err();
        assert_eq!(
            err,
            Error::HttpStatus {
                status: 404,
                body: "missing".to_string()
            }
        );
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_post_created_returns_body() {
        let server = MockServer::start().await;
        let fixture = json!({
            "id": 123_456,
            "name": "test",
            "bgp": {"enabled": false, "local_asn": 0},
            "href": "/projects/123456"
        });

        Mock::given(method("POST"))
            .and(path("/v1/teams/1/projects"))
            .and(body_json(json!({"name": "test", "bgp": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(fixture.clone()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client
            .post(
                "teams/1/projects",
                &json!({"name": "test", "bgp": false}),
                None,
                TIMEOUT,
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.json::<serde_json::Value>().unwrap(), fixture);
        assert_eq!(response.resource_id::<u64>().unwrap(), 123_456);
    }

    #[tokio::test]
    async fn test_put_and_patch_send_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v1/teams/1"))
            .and(body_json(json!({"name": "renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/v1/backup-storages/1/methods/ftp"))
            .and(body_json(json!({"enabled": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client
            .put("teams/1", &json!({"name": "renamed"}), None, TIMEOUT)
            .await
            .unwrap();
        client
            .patch(
                "backup-storages/1/methods/ftp",
                &json!({"enabled": true}),
                None,
                TIMEOUT,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/ssh-keys/1234"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client.delete("ssh-keys/1234", None, TIMEOUT).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/regions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get("regions", None, TIMEOUT).await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/regions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get("regions", None, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RequestTimeout(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_validation_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let response = client.get("user", None, TIMEOUT).await.unwrap();
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
