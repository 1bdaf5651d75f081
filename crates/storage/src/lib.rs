//! sel-storage: HTTP client for the Selectel storage API
//!
//! [`Client`] implements [`sel_core::StorageApi`] on top of a pluggable
//! [`Transport`]. The default transport uses `reqwest`.
//!
//! ```no_run
//! # async fn demo() -> sel_storage::Result<()> {
//! use sel_storage::Client;
//!
//! let client = Client::new("user", "key").await?;
//! let photos = client.create_container("photos", false).await?;
//! photos
//!     .upload_bytes("hello".into(), "hello.txt", "text/plain")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod auth;
pub mod body;
pub mod client;
mod container;
pub mod fs;
mod headers;
mod object;
pub mod transport;

pub use body::Body;
pub use client::{Client, ClientBuilder};
pub use fs::{FileStat, FileSystem, LocalFileSystem};
pub use transport::{HttpTransport, Transport, TransportError};

pub use sel_core::{
    Config, Container, ContainerInfo, ContainerType, Credentials, Error, Object, ObjectInfo,
    Result, StorageApi, StorageApiExt, StorageInformation,
};
