//! Portable request.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use super::body::{Body, BodyError};

#[derive(Debug)]
struct Head {
    method: Method,
    url: Uri,
    headers: HeaderMap,
}

/// Snapshot of an incoming request, independent of the host server.
///
/// The head is immutable. The body can be read once; clones share the same
/// body slot, so a handler further down a chain sees that an earlier one
/// already consumed it.
#[derive(Debug, Clone)]
pub struct Request {
    head: Arc<Head>,
    body: Arc<Mutex<Option<Body>>>,
}

impl Request {
    pub fn new(method: Method, url: Uri, headers: HeaderMap, body: Body) -> Self {
        Self {
            head: Arc::new(Head {
                method,
                url,
                headers,
            }),
            body: Arc::new(Mutex::new(Some(body))),
        }
    }

    /// Start a request by hand, mostly useful in handler tests.
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Absolute URL of the request.
    pub fn url(&self) -> &Uri {
        &self.head.url
    }

    pub fn path(&self) -> &str {
        self.head.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.head.url.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the body has already been taken.
    pub fn body_used(&self) -> bool {
        self.body.lock().is_none()
    }

    /// Take the body stream. Succeeds once per request, across all clones.
    pub fn take_body(&self) -> Result<Body, BodyError> {
        self.body.lock().take().ok_or(BodyError::AlreadyConsumed)
    }

    pub async fn bytes(&self) -> Result<Bytes, BodyError> {
        self.take_body()?.collect().await
    }

    pub async fn text(&self) -> Result<String, BodyError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    url: Uri,
    headers: HeaderMap,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            url: Uri::from_static("http://localhost/"),
            headers: HeaderMap::new(),
        }
    }
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn url(mut self, url: Uri) -> Self {
        self.url = url;
        self
    }

    pub fn header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(self, body: impl Into<Body>) -> Request {
        Request::new(self.method, self.url, self.headers, body.into())
    }

    pub fn empty(self) -> Request {
        self.body(Body::empty())
    }
}
