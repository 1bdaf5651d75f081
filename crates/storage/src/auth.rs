//! Authentication handshake and token session
//!
//! The auth endpoint answers `204 No Content` with the token, its lifetime
//! and the account's storage URL in headers. A [`Session`] keeps the latest
//! grant together with the moment it was requested.

use std::time::Duration;

use http::{HeaderValue, Method, Request, Response, StatusCode};
use sel_core::{Credentials, Error, Result};
use tokio::time::Instant;
use url::Url;

use crate::body::Body;
use crate::headers;

/// Token, lifetime and endpoint returned by a successful handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Grant {
    pub token: String,
    pub lifetime: Duration,
    pub endpoint: Url,
}

/// Mutable authentication state owned by a client
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub credentials: Option<Credentials>,
    pub token: Option<String>,
    pub lifetime: Duration,
    pub issued_at: Option<Instant>,
    pub endpoint: Option<Url>,
}

impl Session {
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Default::default()
        }
    }

    /// Expired when never authenticated, or once `issued_at + lifetime + margin` is reached
    pub fn is_expired(&self, margin: Duration) -> bool {
        match self.issued_at {
            None => true,
            Some(issued_at) => Instant::now() >= issued_at + self.lifetime + margin,
        }
    }

    /// Install a grant. Token, endpoint and validity window change together.
    pub fn apply(&mut self, credentials: Credentials, grant: Grant, issued_at: Instant) {
        self.credentials = Some(credentials);
        self.token = Some(grant.token);
        self.lifetime = grant.lifetime;
        self.endpoint = Some(grant.endpoint);
        self.issued_at = Some(issued_at);
    }
}

/// Build the handshake request carrying the credentials as headers
pub(crate) fn auth_request(auth_url: &Url, credentials: &Credentials) -> Result<Request<Body>> {
    let user = HeaderValue::from_str(credentials.user()).map_err(|_| Error::BadCredentials)?;
    let mut key = HeaderValue::from_str(credentials.key()).map_err(|_| Error::BadCredentials)?;
    key.set_sensitive(true);

    Request::builder()
        .method(Method::GET)
        .uri(auth_url.as_str())
        .header(headers::AUTH_USER, user)
        .header(headers::AUTH_KEY, key)
        .body(Body::empty())
        .map_err(|e| Error::Authentication(format!("Invalid auth URL {auth_url}: {e}")))
}

/// Extract a [`Grant`] from the handshake response
pub(crate) fn parse_grant(response: &Response<Body>) -> Result<Grant> {
    if response.status() != StatusCode::NO_CONTENT {
        return Err(Error::Authentication(format!(
            "Auth endpoint returned {}",
            response.status()
        )));
    }

    let hdrs = response.headers();

    let expire = headers::get_str(hdrs, headers::AUTH_EXPIRE).unwrap_or_default();
    let lifetime = expire.trim().parse::<u64>().map_err(|e| {
        Error::Parse(format!(
            "Invalid {} header '{expire}': {e}",
            headers::AUTH_EXPIRE
        ))
    })?;

    let token = headers::get_str(hdrs, headers::AUTH_TOKEN)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Authentication("No auth token in response".to_string()))?;

    let raw_endpoint = headers::get_str(hdrs, headers::STORAGE_URL)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::Authentication("No storage URL in response".to_string()))?;
    let endpoint = parse_endpoint(raw_endpoint)?;

    Ok(Grant {
        token: token.to_string(),
        lifetime: Duration::from_secs(lifetime),
        endpoint,
    })
}

/// Parse the storage URL and make sure its path ends with `/`
fn parse_endpoint(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| Error::Authentication(format!("Invalid storage URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::Authentication(format!(
            "Storage URL '{raw}' is not an absolute http(s) URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
