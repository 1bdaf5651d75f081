//! Header names and value parsing

use http::HeaderMap;
use sel_core::{Error, Result};

pub const AUTH_USER: &str = "x-auth-user";
pub const AUTH_KEY: &str = "x-auth-key";
pub const AUTH_TOKEN: &str = "x-auth-token";
pub const AUTH_EXPIRE: &str = "x-expire-auth-token";
pub const STORAGE_URL: &str = "x-storage-url";

pub const ACCOUNT_OBJECT_COUNT: &str = "x-account-object-count";
pub const ACCOUNT_BYTES_USED: &str = "x-account-bytes-used";
pub const ACCOUNT_CONTAINER_COUNT: &str = "x-account-container-count";
pub const RECEIVED_BYTES: &str = "x-received-bytes";
pub const TRANSFERRED_BYTES: &str = "x-transfered-bytes";

pub const CONTAINER_OBJECT_COUNT: &str = "x-container-object-count";
pub const CONTAINER_BYTES_USED: &str = "x-container-bytes-used";
pub const CONTAINER_META_TYPE: &str = "x-container-meta-type";

pub const OBJECT_DOWNLOADS: &str = "x-object-downloads";

/// Header value as text; absent or non-ASCII values read as `None`
pub fn get_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Unsigned counter header. Absent reads as 0, anything else must be a decimal `u64`.
pub fn get_u64(headers: &HeaderMap, name: &str) -> Result<u64> {
    match get_str(headers, name).map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse()
            .map_err(|e| Error::Parse(format!("Invalid {name} header '{value}': {e}"))),
    }
}
