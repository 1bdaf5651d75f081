//! Storage data model
//!
//! Snapshots of containers, objects and the account as reported by the
//! server. None of these are cached; every value reflects one response.

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Container visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    /// Objects can be downloaded without a token
    #[default]
    Public,
    /// Objects require a token
    Private,
}

impl ContainerType {
    /// Value sent in and read from `X-Container-Meta-Type`
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::Public => "public",
            ContainerType::Private => "private",
        }
    }

    /// Visibility for a `private` flag
    pub fn from_private(private: bool) -> Self {
        if private {
            ContainerType::Private
        } else {
            ContainerType::Public
        }
    }
}

impl std::fmt::Display for ContainerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContainerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" => Ok(ContainerType::Public),
            "private" => Ok(ContainerType::Private),
            _ => Err(Error::Parse(format!("Invalid container type: {s}"))),
        }
    }
}

/// Container metadata from a listing or a container query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub name: String,

    #[serde(rename = "count")]
    pub object_count: u64,

    #[serde(rename = "bytes")]
    pub bytes_used: u64,

    #[serde(rename = "type", default)]
    pub container_type: ContainerType,

    #[serde(rename = "rx_bytes", default)]
    pub received_bytes: u64,

    #[serde(rename = "tx_bytes", default)]
    pub transferred_bytes: u64,
}

/// Object metadata from a listing or an object query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,

    #[serde(rename = "bytes")]
    pub size: u64,

    #[serde(default)]
    pub content_type: String,

    /// Checksum reported by the server (etag)
    #[serde(default)]
    pub hash: String,

    #[serde(deserialize_with = "deserialize_listing_timestamp")]
    pub last_modified: Timestamp,

    /// Download counter
    #[serde(default)]
    pub downloaded: u64,
}

/// Account-wide counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageInformation {
    pub object_count: u64,
    pub bytes_used: u64,
    pub container_count: u64,
    pub received_bytes: u64,
    pub transferred_bytes: u64,
}

/// Parse an RFC 1123 `last-modified` header, e.g. `Tue, 21 May 2013 12:27:11 GMT`.
///
/// The weekday is not cross-checked against the date.
pub fn parse_http_date(value: &str) -> Result<Timestamp> {
    let value = value.trim();
    let date = value
        .split_once(", ")
        .map(|(_, rest)| rest)
        .unwrap_or(value);

    DateTime::strptime("%d %b %Y %H:%M:%S GMT", date)
        .and_then(|dt| dt.to_zoned(TimeZone::UTC))
        .map(|zdt| zdt.timestamp())
        .map_err(|e| Error::Parse(format!("Invalid last-modified '{value}': {e}")))
}

/// Parse a listing timestamp: ISO 8601 with fractional seconds and no zone, read as UTC.
pub fn parse_listing_timestamp(value: &str) -> Result<Timestamp> {
    value
        .parse::<DateTime>()
        .and_then(|dt| dt.to_zoned(TimeZone::UTC))
        .map(|zdt| zdt.timestamp())
        .map_err(|e| Error::Parse(format!("Invalid timestamp '{value}': {e}")))
}

fn deserialize_listing_timestamp<'de, D>(deserializer: D) -> std::result::Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_listing_timestamp(&raw).map_err(serde::de::Error::custom)
}
