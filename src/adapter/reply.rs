//! Portable response → host reply.

use std::future::Future;

use axum::body::Body as HostBody;
use axum::response::Response as HostResponse;

use crate::portable::{Body, Response};

/// The host server's reply-send API.
pub trait Reply: Send {
    type Output: Send;

    /// Send `response` to the client.
    fn send(self, response: Response) -> impl Future<Output = Self::Output> + Send;
}

/// Reply handle for axum: sending produces the axum response.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostReply;

impl Reply for HostReply {
    type Output = HostResponse;

    fn send(self, response: Response) -> impl Future<Output = HostResponse> + Send {
        std::future::ready(into_host_response(response))
    }
}

/// Convert a portable response into an axum response.
///
/// An empty body maps to a zero-length host body with an exact size hint,
/// so hyper emits a complete response. Stream bodies are forwarded as-is.
pub fn into_host_response(response: Response) -> HostResponse {
    let (status, headers, body) = response.into_parts();
    let mut host = HostResponse::new(into_host_body(body));
    *host.status_mut() = status;
    *host.headers_mut() = headers;
    host
}

fn into_host_body(body: Body) -> HostBody {
    if body.is_empty() {
        return HostBody::empty();
    }
    match body.try_into_bytes() {
        Ok(bytes) => HostBody::from(bytes),
        Err(stream) => HostBody::from_stream(stream.into_stream()),
    }
}
