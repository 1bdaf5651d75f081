//! sel-core: Core library for the Selectel storage client
//!
//! This crate provides the pieces shared by the HTTP client and the CLI:
//! - Error taxonomy
//! - Credentials and configuration
//! - Container/object data model
//! - Name validation and escaping
//! - StorageApi trait and container/object handles
//!
//! It is independent of the HTTP stack, so the handles and the CLI can be
//! exercised against test doubles.

pub mod config;
pub mod credentials;
pub mod error;
pub mod handles;
pub mod path;
pub mod traits;
pub mod types;

pub use config::{Config, ConfigManager};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use handles::{Container, Object};
pub use path::{MAX_NAME_LEN, escape_segment, object_path, validate_name};
pub use traits::{ObjectReader, StorageApi, StorageApiExt, UploadReader};
pub use types::{ContainerInfo, ContainerType, ObjectInfo, StorageInformation};
