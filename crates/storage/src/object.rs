//! Object operations

use std::path::Path;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{HeaderValue, Method, Response, StatusCode};
use sel_core::types::parse_http_date;
use sel_core::{Error, Object, ObjectInfo, ObjectReader, Result, UploadReader};

use crate::body::Body;
use crate::client::{Client, request};
use crate::headers;

const LIST_QUERY: &str = "format=json";

impl Client {
    /// Handle bound to an object. Does not check that it exists.
    pub fn object(&self, container: &str, name: &str) -> Object<'_, Self> {
        Object::new(self, container, name)
    }

    /// Stream `reader` into `container/name`.
    ///
    /// `Content-Type` is sent only when `content_type` is not empty. The
    /// reader is consumed and dropped by this call.
    pub async fn upload(
        &self,
        reader: UploadReader,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()> {
        self.put_object(Body::from_reader(reader), None, container, name, content_type)
            .await
    }

    /// Upload an in-memory buffer
    pub async fn upload_bytes(
        &self,
        data: Bytes,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()> {
        let len = data.len() as u64;
        self.put_object(Body::from(data), Some(len), container, name, content_type)
            .await
    }

    /// Upload a local file under its base name.
    ///
    /// The content type is guessed from the extension. Errors opening or
    /// stating the file are returned as they are.
    pub async fn upload_file(&self, path: &Path, container: &str) -> Result<()> {
        let file = self.files().open(path).await?;
        let stat = self.files().stat(path).await?;
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        tracing::debug!(
            path = %path.display(),
            container,
            size = stat.size,
            %content_type,
            "Uploading file"
        );
        self.put_object(
            Body::from_reader(file),
            Some(stat.size),
            container,
            &stat.name,
            &content_type,
        )
        .await
    }

    async fn put_object(
        &self,
        body: Body,
        content_length: Option<u64>,
        container: &str,
        name: &str,
        content_type: &str,
    ) -> Result<()> {
        let uri = self.target(&[container, name], None).await?;
        let mut req = request(Method::PUT, uri)?;
        *req.body_mut() = body;

        if !content_type.is_empty() {
            let value = HeaderValue::from_str(content_type)
                .map_err(|_| Error::Parse(format!("Invalid content type '{content_type}'")))?;
            req.headers_mut().insert(CONTENT_TYPE, value);
        }
        if let Some(len) = content_length {
            req.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
        }

        let response = self.execute(req).await?;
        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => {
                tracing::warn!(container, object = name, %status, "Upload rejected");
                Err(Error::UnableToUpload {
                    status: status.as_u16(),
                })
            }
        }
    }

    async fn get_object(&self, container: &str, name: &str) -> Result<Response<Body>> {
        let uri = self.target(&[container, name], None).await?;
        let response = self.execute(request(Method::GET, uri)?).await?;
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(format!("{container}/{name}"))),
            status => Err(Error::BadResponse {
                status: status.as_u16(),
            }),
        }
    }

    /// Download an object into memory
    pub async fn download(&self, container: &str, name: &str) -> Result<Bytes> {
        let response = self.get_object(container, name).await?;
        response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    /// Open an object for streaming. Dropping the reader releases the connection.
    pub async fn get_reader(&self, container: &str, name: &str) -> Result<ObjectReader> {
        let response = self.get_object(container, name).await?;
        Ok(Box::new(response.into_body().into_reader()))
    }

    pub async fn remove_object(&self, container: &str, name: &str) -> Result<()> {
        let uri = self.target(&[container, name], None).await?;
        let response = self.execute(request(Method::DELETE, uri)?).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::ObjectNotFound(format!("{container}/{name}"))),
            status => Err(Error::BadResponse {
                status: status.as_u16(),
            }),
        }
    }

    /// Object metadata from response headers.
    ///
    /// An unparsable `last-modified` fails the call.
    pub async fn object_info(&self, container: &str, name: &str) -> Result<ObjectInfo> {
        let uri = self.target(&[container, name], None).await?;
        let response = self.execute(request(Method::HEAD, uri)?).await?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(Error::ObjectNotFound(format!("{container}/{name}")));
            }
            status => {
                return Err(Error::BadResponse {
                    status: status.as_u16(),
                });
            }
        }

        let hdrs = response.headers();
        let last_modified = headers::get_str(hdrs, LAST_MODIFIED.as_str()).unwrap_or_default();

        Ok(ObjectInfo {
            name: name.to_string(),
            size: headers::get_u64(hdrs, CONTENT_LENGTH.as_str())?,
            content_type: headers::get_str(hdrs, CONTENT_TYPE.as_str())
                .unwrap_or_default()
                .to_string(),
            hash: headers::get_str(hdrs, ETAG.as_str())
                .unwrap_or_default()
                .trim_matches('"')
                .to_string(),
            last_modified: parse_http_date(last_modified)?,
            downloaded: headers::get_u64(hdrs, headers::OBJECT_DOWNLOADS)?,
        })
    }

    /// List objects in a container
    pub async fn objects_info(&self, container: &str) -> Result<Vec<ObjectInfo>> {
        let uri = self.target(&[container], Some(LIST_QUERY)).await?;
        let response = self.execute(request(Method::GET, uri)?).await?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(Error::ObjectNotFound(container.to_string())),
            status => {
                return Err(Error::BadResponse {
                    status: status.as_u16(),
                });
            }
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(Error::from_json)
    }

    /// Handles for every object in a container
    pub async fn objects(&self, container: &str) -> Result<Vec<Object<'_, Self>>> {
        let info = self.objects_info(container).await?;
        Ok(info
            .iter()
            .map(|o| self.object(container, &o.name))
            .collect())
    }
}
