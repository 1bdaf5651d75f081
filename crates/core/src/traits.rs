//! StorageApi trait definition
//!
//! The operations every storage client offers. Keeping them behind a trait
//! lets the container/object handles and the CLI run against any
//! implementation, including test doubles.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::error::Result;
use crate::handles::Container;
use crate::types::{ContainerInfo, ContainerType, ObjectInfo, StorageInformation};

/// Readable source for uploads
pub type UploadReader = Box<dyn AsyncRead + Send + Unpin>;

/// Streaming object body; dropping it releases the connection
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Authenticate and store the token, lifetime and endpoint
    async fn authenticate(&self, user: &str, key: &str) -> Result<()>;

    /// Current bearer token, if any authentication succeeded
    async fn token(&self) -> Option<String>;

    /// Account-wide counters
    async fn info(&self) -> Result<StorageInformation>;

    /// Absolute URL of an object under the current endpoint
    async fn object_url(&self, container: &str, name: &str) -> Result<String>;

    /// Create a container; succeeds if it already exists
    async fn put_container(&self, name: &str, container_type: ContainerType) -> Result<()>;

    /// Remove an empty container
    async fn remove_container(&self, name: &str) -> Result<()>;

    /// List all containers
    async fn containers_info(&self) -> Result<Vec<ContainerInfo>>;

    /// Metadata for one container
    async fn container_info(&self, name: &str) -> Result<ContainerInfo>;

    /// Stream `reader` into `container/name`
    async fn upload(
        &self,
        reader: UploadReader,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()>;

    /// Upload an in-memory buffer
    async fn upload_bytes(
        &self,
        data: Bytes,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()>;

    /// Upload a local file under its base name
    async fn upload_file(&self, path: &Path, container: &str) -> Result<()>;

    /// Download an object into memory
    async fn download(&self, container: &str, name: &str) -> Result<Bytes>;

    /// Open an object for streaming
    async fn get_reader(&self, container: &str, name: &str) -> Result<ObjectReader>;

    /// Remove an object
    async fn remove_object(&self, container: &str, name: &str) -> Result<()>;

    /// Metadata for one object
    async fn object_info(&self, container: &str, name: &str) -> Result<ObjectInfo>;

    /// List objects in a container
    async fn objects_info(&self, container: &str) -> Result<Vec<ObjectInfo>>;
}

/// Handle constructors for any [`StorageApi`]
#[async_trait]
pub trait StorageApiExt: StorageApi {
    /// Handle bound to a container name. Does not check that it exists.
    fn container(&self, name: &str) -> Container<'_, Self> {
        Container::new(self, name)
    }

    /// Create a container and return its handle
    async fn create_container(&self, name: &str, private: bool) -> Result<Container<'_, Self>> {
        self.put_container(name, ContainerType::from_private(private))
            .await?;
        Ok(self.container(name))
    }

    /// Handles for every container in the account
    async fn containers(&self) -> Result<Vec<Container<'_, Self>>> {
        let info = self.containers_info().await?;
        Ok(info.iter().map(|c| self.container(&c.name)).collect())
    }
}

impl<T: StorageApi + ?Sized> StorageApiExt for T {}

