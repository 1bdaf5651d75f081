//! Storage client and request dispatcher
//!
//! Every operation builds an HTTP request and hands it to [`Client::execute`],
//! which makes sure a valid token exists (re-authenticating when it has
//! expired), attaches it, sends the request through the [`Transport`] and
//! turns a 401 into [`Error::Authentication`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::uri::{Authority, PathAndQuery, Scheme};
use http::{HeaderValue, Method, Request, Response, StatusCode, Uri};
use sel_core::config::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_MARGIN_SECS};
use sel_core::{
    Config, ContainerInfo, ContainerType, Credentials, Error, ObjectInfo, ObjectReader, Result,
    StorageApi, StorageInformation, UploadReader,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::auth::{self, Grant, Session};
use crate::body::Body;
use crate::fs::{FileSystem, LocalFileSystem};
use crate::headers;
use crate::transport::{HttpTransport, Transport};

/// Storage API client
///
/// The client is `Send + Sync`. Token refresh is serialized: when several
/// callers find the token expired at once, the first refreshes it and the
/// rest reuse the new token.
pub struct Client {
    transport: Arc<dyn Transport>,
    files: Arc<dyn FileSystem>,
    auth_url: Url,
    token_margin: Duration,
    session: Mutex<Session>,
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    files: Option<Arc<dyn FileSystem>>,
    auth_url: String,
    token_margin: Duration,
    timeout: Option<Duration>,
    credentials: Option<Credentials>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            files: None,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_margin: Duration::from_secs(DEFAULT_TOKEN_MARGIN_SECS),
            timeout: None,
            credentials: None,
        }
    }

    /// Start from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new()
            .auth_url(&config.auth_url)
            .token_margin(Duration::from_secs(config.token_margin_secs));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn file_system(mut self, files: impl FileSystem + 'static) -> Self {
        self.files = Some(Arc::new(files));
        self
    }

    pub fn auth_url(mut self, url: &str) -> Self {
        self.auth_url = url.to_string();
        self
    }

    pub fn token_margin(mut self, margin: Duration) -> Self {
        self.token_margin = margin;
        self
    }

    /// Timeout for the default `reqwest` transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build without touching the network. The first request authenticates.
    pub fn build(self) -> Result<Client> {
        let auth_url = Url::parse(&self.auth_url)
            .map_err(|e| Error::Config(format!("Invalid auth URL '{}': {e}", self.auth_url)))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new(self.timeout).map_err(|e| Error::Transport(e.to_string()))?,
            ),
        };
        let files = self
            .files
            .unwrap_or_else(|| Arc::new(LocalFileSystem));
        let session = match self.credentials {
            Some(credentials) => Session::with_credentials(credentials),
            None => Session::default(),
        };

        Ok(Client {
            transport,
            files,
            auth_url,
            token_margin: self.token_margin,
            session: Mutex::new(session),
        })
    }

    /// Build and authenticate immediately
    pub async fn connect(self) -> Result<Client> {
        let credentials = self.credentials.clone().ok_or(Error::BadCredentials)?;
        let client = self.build()?;
        client
            .authenticate(credentials.user(), credentials.key())
            .await?;
        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client and authenticate right away
    pub async fn new(user: &str, key: &str) -> Result<Self> {
        let credentials = Credentials::new(user, key)?;
        ClientBuilder::new().credentials(credentials).connect().await
    }

    /// Create a client that authenticates on its first request.
    ///
    /// Blank credentials are rejected here, before any network use.
    pub fn lazy(user: &str, key: &str) -> Result<Self> {
        let credentials = Credentials::new(user, key)?;
        ClientBuilder::new().credentials(credentials).build()
    }

    /// Like [`Client::new`] with credentials from `SELECTEL_USER` / `SELECTEL_KEY`
    pub async fn from_env() -> Result<Self> {
        let credentials = Credentials::from_env()?;
        ClientBuilder::new().credentials(credentials).connect().await
    }

    /// Authenticate and store token, lifetime, endpoint and credentials
    pub async fn authenticate(&self, user: &str, key: &str) -> Result<()> {
        let credentials = Credentials::new(user, key)?;
        let mut session = self.session.lock().await;
        let issued_at = Instant::now();
        let grant = self.handshake(&credentials).await?;
        session.apply(credentials, grant, issued_at);
        Ok(())
    }

    /// Current bearer token
    pub async fn token(&self) -> Option<String> {
        self.session.lock().await.token.clone()
    }

    /// Storage endpoint from the last authentication
    pub async fn endpoint(&self) -> Option<Url> {
        self.session.lock().await.endpoint.clone()
    }

    /// Whether the next request will re-authenticate first
    pub async fn is_expired(&self) -> bool {
        self.session.lock().await.is_expired(self.token_margin)
    }

    async fn handshake(&self, credentials: &Credentials) -> Result<Grant> {
        let request = auth::auth_request(&self.auth_url, credentials)?;
        let response = self.send(request).await.map_err(|e| match e {
            Error::Transport(msg) => Error::Authentication(msg),
            other => other,
        })?;
        auth::parse_grant(&response)
    }

    /// Send a request with token handling.
    ///
    /// If the token has expired it is refreshed first and the request target
    /// is moved onto the (possibly new) storage endpoint.
    pub async fn execute(&self, mut request: Request<Body>) -> Result<Response<Body>> {
        if let Some(token) = self.prepare(&mut request).await? {
            let mut value = HeaderValue::from_str(&token)
                .map_err(|_| Error::Authentication("Token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            request.headers_mut().insert(headers::AUTH_TOKEN, value);
        }
        self.send(request).await
    }

    /// Refresh the token if needed and fix up the request target.
    /// Returns the token to attach.
    async fn prepare(&self, request: &mut Request<Body>) -> Result<Option<String>> {
        let mut session = self.session.lock().await;

        if session.is_expired(self.token_margin) {
            tracing::info!("Token expired, re-authenticating");
            let credentials = session.credentials.clone().ok_or(Error::BadCredentials)?;
            let previous = session.endpoint.clone();
            let issued_at = Instant::now();
            let grant = self.handshake(&credentials).await?;
            let endpoint = grant.endpoint.clone();
            session.apply(credentials, grant, issued_at);
            *request.uri_mut() = rebase_uri(request.uri(), previous.as_ref(), &endpoint)?;
        } else if request.uri().authority().is_none()
            && let Some(endpoint) = &session.endpoint
        {
            *request.uri_mut() = rebase_uri(request.uri(), None, endpoint)?;
        }

        Ok(session.token.clone())
    }

    /// Send through the transport, timing the call and translating 401
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>> {
        let method = request.method().clone();
        let uri = request.uri().clone();

        let start = std::time::Instant::now();
        let result = self.transport.send(request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Err(e) => {
                tracing::info!(%method, %uri, error = %e, elapsed_ms, "Request failed");
                Err(Error::Transport(e.to_string()))
            }
            Ok(response) => {
                let status = response.status();
                tracing::info!(%method, %uri, status = status.as_u16(), elapsed_ms, "Request completed");
                if status == StatusCode::UNAUTHORIZED {
                    return Err(Error::Authentication(format!("{method} {uri} returned 401")));
                }
                Ok(response)
            }
        }
    }

    /// Target for `segments` under the current endpoint.
    ///
    /// Before the first authentication the target is relative; the dispatcher
    /// resolves it once an endpoint is known.
    pub(crate) async fn target(&self, segments: &[&str], query: Option<&str>) -> Result<Uri> {
        let path = sel_core::object_path(segments)?;
        let mut target = match self.session.lock().await.endpoint.as_ref() {
            Some(endpoint) => format!("{endpoint}{path}"),
            None => format!("/{path}"),
        };
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        target
            .parse()
            .map_err(|e| Error::BadName(format!("Invalid target '{target}': {e}")))
    }

    /// Absolute URL of an object under the current endpoint
    pub async fn object_url(&self, container: &str, name: &str) -> Result<String> {
        let path = sel_core::object_path(&[container, name])?;
        let session = self.session.lock().await;
        let endpoint = session.endpoint.as_ref().ok_or_else(|| {
            Error::Authentication("No storage endpoint, authenticate first".to_string())
        })?;
        Ok(format!("{endpoint}{path}"))
    }

    /// Account-wide counters
    pub async fn info(&self) -> Result<StorageInformation> {
        let uri = self.target(&[], None).await?;
        let response = self.execute(request(Method::GET, uri)?).await?;
        if !response.status().is_success() {
            return Err(Error::BadResponse {
                status: response.status().as_u16(),
            });
        }

        let hdrs = response.headers();
        Ok(StorageInformation {
            object_count: headers::get_u64(hdrs, headers::ACCOUNT_OBJECT_COUNT)?,
            bytes_used: headers::get_u64(hdrs, headers::ACCOUNT_BYTES_USED)?,
            container_count: headers::get_u64(hdrs, headers::ACCOUNT_CONTAINER_COUNT)?,
            received_bytes: headers::get_u64(hdrs, headers::RECEIVED_BYTES)?,
            transferred_bytes: headers::get_u64(hdrs, headers::TRANSFERRED_BYTES)?,
        })
    }

    pub(crate) fn files(&self) -> &dyn FileSystem {
        self.files.as_ref()
    }
}

/// Build a request with an empty body
pub(crate) fn request(method: Method, uri: Uri) -> Result<Request<Body>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .map_err(|e| Error::BadName(e.to_string()))
}

/// Move `uri` onto `endpoint`.
///
/// Relative targets are resolved against the endpoint. Targets under the
/// previous endpoint keep everything after it. Anything else keeps its path
/// and query and takes the endpoint's scheme and host.
pub(crate) fn rebase_uri(uri: &Uri, previous: Option<&Url>, endpoint: &Url) -> Result<Uri> {
    let invalid = |e: &dyn std::fmt::Display| Error::BadName(format!("Invalid target: {e}"));

    if uri.authority().is_none() {
        let rest = uri
            .path_and_query()
            .map(|pq| pq.as_str().trim_start_matches('/'))
            .unwrap_or_default();
        return format!("{endpoint}{rest}").parse().map_err(|e| invalid(&e));
    }

    let current = uri.to_string();
    if let Some(previous) = previous
        && let Some(rest) = current.strip_prefix(previous.as_str())
    {
        return format!("{endpoint}{rest}").parse().map_err(|e| invalid(&e));
    }

    let host = endpoint
        .host_str()
        .ok_or_else(|| Error::BadName(format!("Endpoint {endpoint} has no host")))?;
    let authority = match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let path_and_query = uri
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    Uri::builder()
        .scheme(endpoint.scheme().parse::<Scheme>().map_err(|e| invalid(&e))?)
        .authority(authority.parse::<Authority>().map_err(|e| invalid(&e))?)
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| invalid(&e))
}

#[async_trait]
impl StorageApi for Client {
    async fn authenticate(&self, user: &str, key: &str) -> Result<()> {
        Client::authenticate(self, user, key).await
    }

    async fn token(&self) -> Option<String> {
        Client::token(self).await
    }

    async fn info(&self) -> Result<StorageInformation> {
        Client::info(self).await
    }

    async fn object_url(&self, container: &str, name: &str) -> Result<String> {
        Client::object_url(self, container, name).await
    }

    async fn put_container(&self, name: &str, container_type: ContainerType) -> Result<()> {
        Client::put_container(self, name, container_type).await
    }

    async fn remove_container(&self, name: &str) -> Result<()> {
        Client::remove_container(self, name).await
    }

    async fn containers_info(&self) -> Result<Vec<ContainerInfo>> {
        Client::containers_info(self).await
    }

    async fn container_info(&self, name: &str) -> Result<ContainerInfo> {
        Client::container_info(self, name).await
    }

    async fn upload(
        &self,
        reader: UploadReader,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()> {
        Client::upload(self, reader, container, name, content_type).await
    }

    async fn upload_bytes(
        &self,
        data: Bytes,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()> {
        Client::upload_bytes(self, data, container, name, content_type).await
    }

    async fn upload_file(&self, path: &Path, container: &str) -> Result<()> {
        Client::upload_file(self, path, container).await
    }

    async fn download(&self, container: &str, name: &str) -> Result<Bytes> {
        Client::download(self, container, name).await
    }

    async fn get_reader(&self, container: &str, name: &str) -> Result<ObjectReader> {
        Client::get_reader(self, container, name).await
    }

    async fn remove_object(&self, container: &str, name: &str) -> Result<()> {
        Client::remove_object(self, container, name).await
    }

    async fn object_info(&self, container: &str, name: &str) -> Result<ObjectInfo> {
        Client::object_info(self, container, name).await
    }

    async fn objects_info(&self, container: &str) -> Result<Vec<ObjectInfo>> {
        Client::objects_info(self, container).await
    }
}
