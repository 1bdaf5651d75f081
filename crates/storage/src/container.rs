//! Container operations

use http::{HeaderValue, Method, StatusCode};
use sel_core::{Container, ContainerInfo, ContainerType, Error, Result};

use crate::client::{Client, request};
use crate::headers;

const LIST_QUERY: &str = "format=json";

impl Client {
    /// Create a container and return its handle.
    ///
    /// An existing container (202 Accepted) counts as success.
    pub async fn create_container(&self, name: &str, private: bool) -> Result<Container<'_, Self>> {
        self.put_container(name, ContainerType::from_private(private))
            .await?;
        Ok(Container::new(self, name))
    }

    /// Handle bound to a container name. Does not check that it exists.
    pub fn container(&self, name: &str) -> Container<'_, Self> {
        Container::new(self, name)
    }

    pub async fn put_container(&self, name: &str, container_type: ContainerType) -> Result<()> {
        let uri = self.target(&[name], None).await?;
        let mut req = request(Method::PUT, uri)?;
        req.headers_mut().insert(
            headers::CONTAINER_META_TYPE,
            HeaderValue::from_static(container_type.as_str()),
        );
        tracing::debug!(container = name, %container_type, "Creating container");

        let response = self.execute(req).await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::ACCEPTED => Ok(()),
            status => Err(Error::BadResponse {
                status: status.as_u16(),
            }),
        }
    }

    /// Remove a container. It must exist and be empty.
    pub async fn remove_container(&self, name: &str) -> Result<()> {
        let uri = self.target(&[name], None).await?;
        let response = self.execute(request(Method::DELETE, uri)?).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::CONFLICT => Err(Error::ContainerNotEmpty(name.to_string())),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(name.to_string())),
            status => Err(Error::BadResponse {
                status: status.as_u16(),
            }),
        }
    }

    /// List every container in the account
    pub async fn containers_info(&self) -> Result<Vec<ContainerInfo>> {
        let uri = self.target(&[], Some(LIST_QUERY)).await?;
        let response = self.execute(request(Method::GET, uri)?).await?;
        if response.status() != StatusCode::OK {
            return Err(Error::BadResponse {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(Error::from_json)
    }

    /// Handles for every container in the account
    pub async fn containers(&self) -> Result<Vec<Container<'_, Self>>> {
        let info = self.containers_info().await?;
        Ok(info.iter().map(|c| self.container(&c.name)).collect())
    }

    /// Container metadata from response headers
    pub async fn container_info(&self, name: &str) -> Result<ContainerInfo> {
        let uri = self.target(&[name], None).await?;
        let response = self.execute(request(Method::HEAD, uri)?).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::ObjectNotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(Error::BadResponse {
                status: status.as_u16(),
            });
        }

        let hdrs = response.headers();
        let container_type = match headers::get_str(hdrs, headers::CONTAINER_META_TYPE) {
            Some(value) if !value.is_empty() => value.parse()?,
            _ => ContainerType::default(),
        };

        Ok(ContainerInfo {
            name: name.to_string(),
            object_count: headers::get_u64(hdrs, headers::CONTAINER_OBJECT_COUNT)?,
            bytes_used: headers::get_u64(hdrs, headers::CONTAINER_BYTES_USED)?,
            container_type,
            received_bytes: headers::get_u64(hdrs, headers::RECEIVED_BYTES)?,
            transferred_bytes: headers::get_u64(hdrs, headers::TRANSFERRED_BYTES)?,
        })
    }
}
