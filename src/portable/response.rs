//! Portable response.
//!
//! # Design Decisions
//! - The body is never optional: every constructor funnels through
//!   [`normalize_body`], so a response without content carries a closed
//!   empty stream
//! - A body that is already a stream is kept exactly as given

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

use super::body::Body;

/// Resolve an optional body into a present one.
pub fn normalize_body(body: Option<Body>) -> Body {
    body.unwrap_or_else(Body::empty)
}

/// Response produced by a portable handler.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, body: Option<Body>) -> Self {
        Self::from_parts(status, HeaderMap::new(), body)
    }

    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Option<Body>) -> Self {
        Self {
            status,
            headers,
            body: normalize_body(body),
        }
    }

    /// A response with no content.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, None)
    }

    pub fn with_body(status: StatusCode, body: impl Into<Body>) -> Self {
        Self::new(status, Some(body.into()))
    }

    pub fn text(status: StatusCode, text: impl Into<String>) -> Self {
        Self::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))
            .body(text.into())
    }

    pub fn html(status: StatusCode, html: impl Into<String>) -> Self {
        Self::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))
            .body(html.into())
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::builder()
            .status(status)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(bytes))
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }
}

/// Builder for [`Response`]. Status defaults to `200 OK`.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

impl ResponseBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(self, body: impl Into<Body>) -> Response {
        Response::from_parts(self.status, self.headers, Some(body.into()))
    }

    /// Finish with an optional body; `None` becomes the empty stream.
    pub fn maybe_body(self, body: Option<Body>) -> Response {
        Response::from_parts(self.status, self.headers, body)
    }

    pub fn empty(self) -> Response {
        self.maybe_body(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;

    #[tokio::test]
    async fn missing_body_becomes_empty_stream() {
        let res = Response::new(StatusCode::OK, None);
        assert!(res.body().is_empty());
        assert_eq!(res.body().exact_len(), Some(0));
        assert!(res.into_body().collect().await.unwrap().is_empty());
    }

    #[test]
    fn stream_body_is_not_rewrapped() {
        let body = Body::from_stream(stream::empty::<Result<Bytes, std::io::Error>>());
        let res = Response::new(StatusCode::OK, Some(body));
        assert!(res.body().is_stream());
    }

    #[tokio::test]
    async fn json_sets_content_type() {
        let res = Response::json(StatusCode::CREATED, &serde_json::json!({"title": "x"})).unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        let bytes = res.into_body().collect().await.unwrap();
        assert_eq!(&bytes[..], br#"{"title":"x"}"#);
    }

    #[test]
    fn builder_keeps_repeated_headers() {
        let res = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(http::header::SET_COOKIE, HeaderValue::from_static("a=1"))
            .header(http::header::SET_COOKIE, HeaderValue::from_static("b=2"))
            .empty();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers().get_all(http::header::SET_COOKIE).iter().count(), 2);
        assert!(res.body().is_empty());
    }
}
