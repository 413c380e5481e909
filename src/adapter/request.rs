//! Host request → portable request.
//!
//! # Responsibilities
//! - Copy method and headers
//! - Rebuild an absolute URL from the request target and `Host`
//! - Hand over the raw body as an unread stream
//!
//! # Design Decisions
//! - The body is never parsed or buffered here
//! - Pure translation: no logging, no error path

use axum::body::HttpBody;
use axum::extract::Request as HostRequest;
use axum::http::uri::{Authority, Scheme};
use axum::http::{header, Extensions, Uri};

use crate::portable::{Body, Request};

const FALLBACK_AUTHORITY: &str = "localhost";

/// Converts host-native requests into portable ones.
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    scheme: Scheme,
}

impl Default for RequestAdapter {
    fn default() -> Self {
        Self {
            scheme: Scheme::HTTP,
        }
    }
}

/// Create an adapter using the `http` scheme for relative targets.
pub fn create_request_adapter() -> RequestAdapter {
    RequestAdapter::default()
}

impl RequestAdapter {
    /// Use `scheme` when the request target carries none.
    pub fn with_scheme(scheme: Scheme) -> Self {
        Self { scheme }
    }

    /// Convert `raw`.
    ///
    /// Returns the portable request and the host request's extensions,
    /// which the portable side never sees.
    pub fn adapt(&self, raw: HostRequest) -> (Request, Extensions) {
        let (parts, body) = raw.into_parts();
        let url = self.absolute_url(&parts.uri, &parts.headers);

        let body = if body.size_hint().exact() == Some(0) {
            Body::empty()
        } else {
            Body::from_stream(body.into_data_stream())
        };

        let request = Request::new(parts.method, url, parts.headers, body);
        (request, parts.extensions)
    }

    fn absolute_url(&self, target: &Uri, headers: &axum::http::HeaderMap) -> Uri {
        if target.scheme().is_some() && target.authority().is_some() {
            return target.clone();
        }

        let authority = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.parse::<Authority>().ok())
            .unwrap_or_else(|| Authority::from_static(FALLBACK_AUTHORITY));

        let mut uri_parts = target.clone().into_parts();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(authority);
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(axum::http::uri::PathAndQuery::from_static("/"));
        }
        Uri::from_parts(uri_parts).unwrap_or_else(|_| target.clone())
    }
}
