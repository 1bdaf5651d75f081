//! Container and object handles
//!
//! Thin wrappers that bind names to a [`StorageApi`] and forward every call.

use std::fmt;
use std::path::Path;

use bytes::Bytes;

use crate::error::Result;
use crate::traits::{ObjectReader, StorageApi, UploadReader};
use crate::types::{ContainerInfo, ContainerType, ObjectInfo};

/// A container bound to a client
pub struct Container<'a, S: StorageApi + ?Sized> {
    api: &'a S,
    name: String,
}

impl<'a, S: StorageApi + ?Sized> Container<'a, S> {
    pub fn new(api: &'a S, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create this container
    pub async fn create(&self, private: bool) -> Result<()> {
        self.api
            .put_container(&self.name, ContainerType::from_private(private))
            .await
    }

    /// Remove this container. It must be empty.
    pub async fn remove(&self) -> Result<()> {
        self.api.remove_container(&self.name).await
    }

    pub async fn info(&self) -> Result<ContainerInfo> {
        self.api.container_info(&self.name).await
    }

    /// Handle for an object in this container
    pub fn object(&self, name: impl Into<String>) -> Object<'a, S> {
        Object::new(self.api, self.name.clone(), name)
    }

    pub async fn objects_info(&self) -> Result<Vec<ObjectInfo>> {
        self.api.objects_info(&self.name).await
    }

    /// Handles for every object in this container
    pub async fn objects(&self) -> Result<Vec<Object<'a, S>>> {
        let info = self.objects_info().await?;
        Ok(info.into_iter().map(|o| self.object(o.name)).collect())
    }

    pub async fn upload(&self, reader: UploadReader, name: &str, content_type: &str) -> Result<()> {
        self.api
            .upload(reader, &self.name, name, content_type)
            .await
    }

    pub async fn upload_bytes(&self, data: Bytes, name: &str, content_type: &str) -> Result<()> {
        self.api
            .upload_bytes(data, &self.name, name, content_type)
            .await
    }

    pub async fn upload_file(&self, path: &Path) -> Result<()> {
        self.api.upload_file(path, &self.name).await
    }

    pub async fn remove_object(&self, name: &str) -> Result<()> {
        self.api.remove_object(&self.name, name).await
    }

    pub async fn url(&self, name: &str) -> Result<String> {
        self.api.object_url(&self.name, name).await
    }
}

impl<S: StorageApi + ?Sized> Clone for Container<'_, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api,
            name: self.name.clone(),
        }
    }
}

impl<S: StorageApi + ?Sized> fmt::Debug for Container<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container").field("name", &self.name).finish()
    }
}

/// An object bound to a client and container
pub struct Object<'a, S: StorageApi + ?Sized> {
    api: &'a S,
    container: String,
    name: String,
}

impl<'a, S: StorageApi + ?Sized> Object<'a, S> {
    pub fn new(api: &'a S, container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api,
            container: container.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub async fn info(&self) -> Result<ObjectInfo> {
        self.api.object_info(&self.container, &self.name).await
    }

    pub async fn download(&self) -> Result<Bytes> {
        self.api.download(&self.container, &self.name).await
    }

    /// Open the object for streaming. The caller owns the reader.
    pub async fn get_reader(&self) -> Result<ObjectReader> {
        self.api.get_reader(&self.container, &self.name).await
    }

    pub async fn upload(&self, reader: UploadReader, content_type: &str) -> Result<()> {
        self.api
            .upload(reader, &self.container, &self.name, content_type)
            .await
    }

    pub async fn upload_bytes(&self, data: Bytes, content_type: &str) -> Result<()> {
        self.api
            .upload_bytes(data, &self.container, &self.name, content_type)
            .await
    }

    pub async fn remove(&self) -> Result<()> {
        self.api.remove_object(&self.container, &self.name).await
    }

    pub async fn url(&self) -> Result<String> {
        self.api.object_url(&self.container, &self.name).await
    }
}

impl<S: StorageApi + ?Sized> Clone for Object<'_, S> {
    fn clone(&self) -> Self {
        Self {
            api: self.api,
            container: self.container.clone(),
            name: self.name.clone(),
        }
    }
}

impl<S: StorageApi + ?Sized> fmt::Debug for Object<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("container", &self.container)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::{MockStorageApi, StorageApiExt};
    use crate::types::StorageInformation;
    use mockall::predicate::eq;

    fn object_info(name: &str) -> ObjectInfo {
        ObjectInfo {
            name: name.to_string(),
            size: 3,
            content_type: "text/plain".to_string(),
            hash: "abc".to_string(),
            last_modified: jiff::Timestamp::UNIX_EPOCH,
            downloaded: 0,
        }
    }

    #[tokio::test]
    async fn test_create_container_returns_bound_handle() {
        let mut api = MockStorageApi::new();
        api.expect_put_container()
            .with(eq("photos"), eq(ContainerType::Private))
            .times(1)
            .returning(|_, _| Ok(()));

        let container = api.create_container("photos", true).await.unwrap();
        assert_eq!(container.name(), "photos");
    }

    #[tokio::test]
    async fn test_create_container_error_propagates() {
        let mut api = MockStorageApi::new();
        api.expect_put_container()
            .returning(|_, _| Err(Error::BadResponse { status: 500 }));

        let err = api.create_container("photos", false).await.unwrap_err();
        assert!(matches!(err, Error::BadResponse { status: 500 }));
    }

    #[tokio::test]
    async fn test_container_remove_forwards_name() {
        let mut api = MockStorageApi::new();
        api.expect_remove_container()
            .with(eq("photos"))
            .times(1)
            .returning(|name| Err(Error::ContainerNotEmpty(name.to_string())));

        let err = api.container("photos").remove().await.unwrap_err();
        assert!(matches!(err, Error::ContainerNotEmpty(_)));
    }

    #[tokio::test]
    async fn test_container_objects_are_bound() {
        let mut api = MockStorageApi::new();
        api.expect_objects_info()
            .with(eq("docs"))
            .returning(|_| Ok(vec![object_info("a.txt"), object_info("b.txt")]));

        let container = api.container("docs");
        let objects = container.objects().await.unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(objects.iter().all(|o| o.container() == "docs"));
    }

    #[tokio::test]
    async fn test_object_handle_forwards() {
        let mut api = MockStorageApi::new();
        api.expect_remove_object()
            .with(eq("docs"), eq("a.txt"))
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_download()
            .with(eq("docs"), eq("a.txt"))
            .returning(|_, _| Ok(Bytes::from_static(b"abc")));
        api.expect_object_url()
            .returning(|c, n| Ok(format!("https://xxx.example.net/{c}/{n}")));

        let object = api.container("docs").object("a.txt");
        assert_eq!(object.download().await.unwrap(), Bytes::from_static(b"abc"));
        assert_eq!(
            object.url().await.unwrap(),
            "https://xxx.example.net/docs/a.txt"
        );
        object.remove().await.unwrap();
    }

    #[tokio::test]
    async fn test_containers_from_listing() {
        let mut api = MockStorageApi::new();
        api.expect_containers_info().returning(|| {
            Ok(vec![ContainerInfo {
                name: "c1".to_string(),
                object_count: 1,
                bytes_used: 2,
                container_type: ContainerType::Public,
                received_bytes: 0,
                transferred_bytes: 0,
            }])
        });
        api.expect_info()
            .returning(|| Ok(StorageInformation::default()));

        let containers = api.containers().await.unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name(), "c1");
        assert_eq!(api.info().await.unwrap().container_count, 0);
    }
}
