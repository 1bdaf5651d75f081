//! End-to-end tests against an in-memory storage server
//!
//! `FakeServer` implements `Transport` and keeps containers and objects in a
//! map, so the client runs its real request building, token handling and
//! response parsing.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use sel_storage::{
    Body, Client, ContainerType, Error, StorageApi, StorageApiExt, Transport, TransportError,
};
use tokio::io::AsyncReadExt;

const AUTH_URL: &str = "https://auth.test/";
const ENDPOINT: &str = "https://storage.test/v1/";
const TOKEN: &str = "secret-token";
const LAST_MODIFIED: &str = "Mon, 21 May 2013 12:27:11 GMT";

#[derive(Default)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    downloads: u64,
}

#[derive(Default)]
struct StoredContainer {
    private: bool,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Clone, Default)]
struct FakeServer {
    containers: Arc<Mutex<BTreeMap<String, StoredContainer>>>,
    auth_calls: Arc<AtomicUsize>,
}

fn reply(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

fn reply_json(value: serde_json::Value) -> Response<Body> {
    let mut response = Response::new(Body::from(value.to_string()));
    response
        .headers_mut()
        .insert("content-type", "application/json".parse().unwrap());
    response
}

impl FakeServer {
    fn auth(&self, req: &Request<Body>) -> Response<Body> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if req.headers()["X-Auth-User"] != "user" || req.headers()["X-Auth-Key"] != "key" {
            return reply(StatusCode::FORBIDDEN);
        }
        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("X-Auth-Token", TOKEN)
            .header("X-Expire-Auth-Token", "3600")
            .header("X-Storage-Url", ENDPOINT)
            .body(Body::empty())
            .unwrap()
    }

    async fn storage(&self, req: Request<Body>) -> Response<Body> {
        if req.headers().get("X-Auth-Token").map(|v| v.as_bytes()) != Some(TOKEN.as_bytes()) {
            return reply(StatusCode::UNAUTHORIZED);
        }

        let (parts, body) = req.into_parts();
        let path = parts
            .uri
            .path()
            .strip_prefix("/v1/")
            .unwrap_or_default()
            .to_string();
        let listing = parts.uri.query() == Some("format=json");
        let data = body.collect().await.unwrap();
        let content_type = parts
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let mut containers = self.containers.lock().unwrap();
        let (container, object) = match path.split_once('/') {
            Some((c, o)) => (c.to_string(), Some(o.to_string())),
            None => (path.clone(), None),
        };

        match (parts.method, container.is_empty(), object) {
            (Method::GET, true, None) if listing => {
                let list: Vec<_> = containers
                    .iter()
                    .map(|(name, c)| {
                        serde_json::json!({
                            "name": name,
                            "count": c.objects.len(),
                            "bytes": c.objects.values().map(|o| o.data.len()).sum::<usize>(),
                            "type": if c.private { "private" } else { "public" },
                            "rx_bytes": 0,
                            "tx_bytes": 0,
                        })
                    })
                    .collect();
                reply_json(serde_json::Value::Array(list))
            }
            (Method::GET, true, None) => {
                let objects: usize = containers.values().map(|c| c.objects.len()).sum();
                Response::builder()
                    .status(StatusCode::NO_CONTENT)
                    .header("X-Account-Container-Count", containers.len())
                    .header("X-Account-Object-Count", objects)
                    .header("X-Account-Bytes-Used", 0)
                    .body(Body::empty())
                    .unwrap()
            }
            (Method::PUT, false, None) => {
                let private = parts
                    .headers
                    .get("x-container-meta-type")
                    .is_some_and(|v| v == "private");
                if containers.contains_key(&container) {
                    reply(StatusCode::ACCEPTED)
                } else {
                    containers.insert(
                        container,
                        StoredContainer {
                            private,
                            ..Default::default()
                        },
                    );
                    reply(StatusCode::CREATED)
                }
            }
            (Method::DELETE, false, None) => match containers.get(&container) {
                None => reply(StatusCode::NOT_FOUND),
                Some(c) if !c.objects.is_empty() => reply(StatusCode::CONFLICT),
                Some(_) => {
                    containers.remove(&container);
                    reply(StatusCode::NO_CONTENT)
                }
            },
            (Method::HEAD, false, None) => match containers.get(&container) {
                None => reply(StatusCode::NOT_FOUND),
                Some(c) => Response::builder()
                    .status(StatusCode::NO_CONTENT)
                    .header("X-Container-Object-Count", c.objects.len())
                    .header(
                        "X-Container-Bytes-Used",
                        c.objects.values().map(|o| o.data.len()).sum::<usize>(),
                    )
                    .header(
                        "X-Container-Meta-Type",
                        if c.private { "private" } else { "public" },
                    )
                    .body(Body::empty())
                    .unwrap(),
            },
            (Method::GET, false, None) if listing => match containers.get(&container) {
                None => reply(StatusCode::NOT_FOUND),
                Some(c) => {
                    let list: Vec<_> = c
                        .objects
                        .iter()
                        .map(|(name, o)| {
                            serde_json::json!({
                                "name": name,
                                "bytes": o.data.len(),
                                "content_type": o.content_type,
                                "hash": "d41d8cd98f00b204e9800998ecf8427e",
                                "last_modified": "2013-05-27T14:42:04.669760",
                                "downloaded": o.downloads,
                            })
                        })
                        .collect();
                    reply_json(serde_json::Value::Array(list))
                }
            },
            (method, false, Some(object)) => {
                let Some(c) = containers.get_mut(&container) else {
                    return reply(StatusCode::NOT_FOUND);
                };
                match method {
                    Method::PUT => {
                        c.objects.insert(
                            object,
                            StoredObject {
                                data,
                                content_type,
                                downloads: 0,
                            },
                        );
                        reply(StatusCode::CREATED)
                    }
                    Method::GET => match c.objects.get_mut(&object) {
                        None => reply(StatusCode::NOT_FOUND),
                        Some(o) => {
                            o.downloads += 1;
                            Response::new(Body::from(o.data.clone()))
                        }
                    },
                    Method::HEAD => match c.objects.get(&object) {
                        None => reply(StatusCode::NOT_FOUND),
                        Some(o) => Response::builder()
                            .status(StatusCode::OK)
                            .header("Content-Length", o.data.len())
                            .header("Content-Type", o.content_type.as_str())
                            .header("ETag", "\"d41d8cd98f00b204e9800998ecf8427e\"")
                            .header("Last-Modified", LAST_MODIFIED)
                            .header("X-Object-Downloads", o.downloads)
                            .body(Body::empty())
                            .unwrap(),
                    },
                    Method::DELETE => match c.objects.remove(&object) {
                        None => reply(StatusCode::NOT_FOUND),
                        Some(_) => reply(StatusCode::NO_CONTENT),
                    },
                    _ => reply(StatusCode::METHOD_NOT_ALLOWED),
                }
            }
            _ => reply(StatusCode::BAD_REQUEST),
        }
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        if request.uri() == AUTH_URL {
            return Ok(self.auth(&request));
        }
        Ok(self.storage(request).await)
    }
}

async fn connect(server: &FakeServer) -> Client {
    Client::builder()
        .auth_url(AUTH_URL)
        .transport(server.clone())
        .credentials(sel_storage::Credentials::new("user", "key").unwrap())
        .connect()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_container_lifecycle() {
    let server = FakeServer::default();
    let client = connect(&server).await;

    let photos = client.create_container("photos", true).await.unwrap();
    // Second create is accepted as success
    client.create_container("photos", true).await.unwrap();

    photos
        .upload_bytes(Bytes::from_static(b"meow"), "cat.jpg", "image/jpeg")
        .await
        .unwrap();

    let info = photos.info().await.unwrap();
    assert_eq!(info.object_count, 1);
    assert_eq!(info.bytes_used, 4);
    assert_eq!(info.container_type, ContainerType::Private);

    let err = photos.remove().await.unwrap_err();
    assert!(matches!(err, Error::ContainerNotEmpty(_)));

    photos.remove_object("cat.jpg").await.unwrap();
    photos.remove().await.unwrap();

    assert!(client.containers_info().await.unwrap().is_empty());
    assert!(matches!(
        client.container_info("photos").await,
        Err(Error::ObjectNotFound(_))
    ));
    assert_eq!(server.auth_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upload_download_round_trip() {
    let server = FakeServer::default();
    let client = connect(&server).await;
    client.create_container("docs", false).await.unwrap();

    let reader = Box::new(std::io::Cursor::new(b"streamed contents".to_vec()));
    client
        .upload(reader, "docs", "notes.txt", "text/plain")
        .await
        .unwrap();

    let data = client.download("docs", "notes.txt").await.unwrap();
    assert_eq!(data, Bytes::from_static(b"streamed contents"));

    let mut reader = client.get_reader("docs", "notes.txt").await.unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    assert_eq!(out, b"streamed contents");

    let info = client.object_info("docs", "notes.txt").await.unwrap();
    assert_eq!(info.size, 17);
    assert_eq!(info.content_type, "text/plain");
    assert_eq!(info.hash, "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(info.downloaded, 2);
    assert_eq!(info.last_modified.as_second(), 1369139231);
}

#[tokio::test]
async fn test_listing_and_handles() {
    let server = FakeServer::default();
    let client = connect(&server).await;

    client.create_container("a", false).await.unwrap();
    client.create_container("b", true).await.unwrap();
    let b = client.container("b");
    b.upload_bytes(Bytes::from_static(b"1"), "one", "").await.unwrap();
    b.upload_bytes(Bytes::from_static(b"22"), "two", "").await.unwrap();

    let containers = client.containers_info().await.unwrap();
    let summary: Vec<_> = containers
        .iter()
        .map(|c| (c.name.as_str(), c.object_count, c.container_type))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a", 0, ContainerType::Public),
            ("b", 2, ContainerType::Private),
        ]
    );

    let objects = b.objects().await.unwrap();
    let names: Vec<_> = objects.iter().map(|o| o.name().to_string()).collect();
    assert_eq!(names, vec!["one", "two"]);
    assert_eq!(objects[1].download().await.unwrap(), Bytes::from_static(b"22"));
    assert_eq!(
        objects[0].url().await.unwrap(),
        "https://storage.test/v1/b/one"
    );

    let info = client.info().await.unwrap();
    assert_eq!(info.container_count, 2);
    assert_eq!(info.object_count, 2);
}

/// Works against any `StorageApi`, not just the HTTP client
async fn count_objects<S: StorageApi>(api: &S) -> sel_storage::Result<u64> {
    let mut total = 0;
    for container in StorageApiExt::containers(api).await? {
        total += container.info().await?.object_count;
    }
    Ok(total)
}

#[tokio::test]
async fn test_generic_over_storage_api() {
    let server = FakeServer::default();
    let client = connect(&server).await;
    client.create_container("x", false).await.unwrap();
    client
        .upload_bytes(Bytes::from_static(b"x"), "x", "x1", "")
        .await
        .unwrap();

    assert_eq!(count_objects(&client).await.unwrap(), 1);
}

#[tokio::test]
async fn test_upload_file_from_disk() {
    let server = FakeServer::default();
    let client = connect(&server).await;
    client.create_container("files", false).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"quarterly numbers").unwrap();
    drop(file);

    client.upload_file(&path, "files").await.unwrap();

    let info = client.object_info("files", "report.txt").await.unwrap();
    assert_eq!(info.size, 17);
    assert_eq!(info.content_type, "text/plain");

    let missing = dir.path().join("missing.txt");
    let err = client.upload_file(&missing, "files").await.unwrap_err();
    assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

#[tokio::test]
async fn test_lazy_client_authenticates_on_first_request() {
    let server = FakeServer::default();
    let client = Client::builder()
        .auth_url(AUTH_URL)
        .transport(server.clone())
        .credentials(sel_storage::Credentials::new("user", "key").unwrap())
        .build()
        .unwrap();
    assert_eq!(server.auth_calls.load(Ordering::SeqCst), 0);

    client.create_container("late", false).await.unwrap();
    assert_eq!(server.auth_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.containers_info().await.unwrap()[0].name, "late");
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let server = FakeServer::default();
    let result = Client::builder()
        .auth_url(AUTH_URL)
        .transport(server)
        .credentials(sel_storage::Credentials::new("user", "nope").unwrap())
        .connect()
        .await;
    assert!(matches!(result, Err(Error::Authentication(_))));
}
