//! Portable handler → host route handler.
//!
//! # Per-request flow
//! ```text
//! host request + reply handle
//!     → acquire Context (route config, upstream extension, or fresh)
//!     → RequestAdapter::adapt
//!     → Handler::call(request, context).await
//!     → None:       return without touching the reply
//!     → Some(resp): reply.send(resp).await
//! ```
//!
//! # Design Decisions
//! - No local recovery: handler errors go straight back to the host
//! - No timeout of its own; the host layers decide
//! - Body normalization lives in `Response` construction, so the adapter
//!   never patches a response after the fact

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request as HostRequest;
use axum::http::{Extensions, StatusCode};
use axum::response::{IntoResponse, Response as HostResponse};

use super::reply::{HostReply, Reply};
use super::request::RequestAdapter;
use crate::portable::{Context, Handler, HandlerError};

/// Typed per-route configuration, fixed at registration time.
#[derive(Debug, Clone, Default)]
pub struct RouteConfig {
    /// Name used in logs.
    pub name: Cow<'static, str>,

    /// Context handed to every invocation on this route. When unset, each
    /// request gets its own.
    pub context: Option<Context>,
}

impl RouteConfig {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }
}

/// Marker extension on the host default response for a request no handler
/// replied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unhandled;

/// Wraps a portable handler for registration on the host server.
pub struct HandlerAdapter<H> {
    handler: Arc<H>,
    requests: RequestAdapter,
    route: RouteConfig,
}

impl<H> Clone for HandlerAdapter<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            requests: self.requests.clone(),
            route: self.route.clone(),
        }
    }
}

/// Wrap `handler` with a default route configuration.
pub fn handler_adapter<H: Handler>(handler: H) -> HandlerAdapter<H> {
    HandlerAdapter::new(handler, RouteConfig::default())
}

impl<H: Handler> HandlerAdapter<H> {
    pub fn new(handler: H, route: RouteConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            requests: RequestAdapter::default(),
            route,
        }
    }

    /// Replace the request adapter.
    pub fn with_request_adapter(mut self, requests: RequestAdapter) -> Self {
        self.requests = requests;
        self
    }

    pub fn route(&self) -> &RouteConfig {
        &self.route
    }

    /// Run one request through the handler.
    ///
    /// Returns `Ok(None)` without calling `reply` when the handler declines.
    pub async fn handle<R: Reply>(
        &self,
        raw: HostRequest,
        reply: R,
    ) -> Result<Option<R::Output>, HandlerError> {
        let (request, mut extensions) = self.requests.adapt(raw);
        let context = self.acquire_context(&mut extensions);

        match self.handler.call(request, context).await? {
            Some(response) => Ok(Some(reply.send(response).await)),
            None => {
                tracing::trace!(route = %self.route.name, "Handler declined request");
                Ok(None)
            }
        }
    }

    fn acquire_context(&self, extensions: &mut Extensions) -> Context {
        if let Some(context) = &self.route.context {
            return context.clone();
        }
        extensions.remove::<Context>().unwrap_or_default()
    }

    /// Turn the adapter into an axum handler.
    ///
    /// A declined request at this point has nothing left to try, so it gets
    /// the host default: an empty `404` tagged with [`Unhandled`].
    pub fn into_route(self) -> RouteHandler {
        let adapter = self;
        let inner: Arc<RouteFn> = Arc::new(move |raw: HostRequest| -> RouteFuture {
            let adapter = adapter.clone();
            Box::pin(async move {
                let reply = adapter.handle(raw, HostReply).await?;
                Ok(reply.unwrap_or_else(unhandled))
            })
        });
        RouteHandler { inner }
    }
}

type RouteFuture = Pin<Box<dyn Future<Output = Result<HostResponse, HandlerError>> + Send>>;
type RouteFn = dyn Fn(HostRequest) -> RouteFuture + Send + Sync;

/// A type-erased axum handler produced by [`HandlerAdapter::into_route`].
#[derive(Clone)]
pub struct RouteHandler {
    inner: Arc<RouteFn>,
}

impl std::fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RouteHandler")
    }
}

impl<S> axum::handler::Handler<RouteHandler, S> for RouteHandler
where
    S: Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = HostResponse> + Send>>;

    fn call(self, req: HostRequest, _state: S) -> Self::Future {
        let fut = (self.inner)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The host default for a request nobody answered.
pub fn unhandled() -> HostResponse {
    let mut res = StatusCode::NOT_FOUND.into_response();
    res.extensions_mut().insert(Unhandled);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portable::{Body, Request, Response};
    use axum::body::{Body as HostBody, HttpBody};
    use axum::http::Method;
    use bytes::Bytes;
    use futures_util::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reply that records how often it was sent.
    #[derive(Clone, Default)]
    struct RecordingReply {
        sends: Arc<AtomicUsize>,
    }

    impl Reply for RecordingReply {
        type Output = HostResponse;

        fn send(self, response: Response) -> impl Future<Output = HostResponse> + Send {
            self.sends.fetch_add(1, Ordering::SeqCst);
            HostReply.send(response)
        }
    }

    fn post(path: &str, body: &'static str) -> HostRequest {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("host", "localhost:3000")
            .body(HostBody::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn declined_request_never_replies() {
        let adapter = handler_adapter(|_req: Request, _ctx: Context| async {});
        let reply = RecordingReply::default();

        let out = adapter.handle(post("/anything", ""), reply.clone()).await.unwrap();

        assert!(out.is_none());
        assert_eq!(reply.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn null_body_is_sent_as_empty_stream() {
        let adapter = handler_adapter(|_req: Request, _ctx: Context| async {
            Response::new(StatusCode::OK, None)
        });
        let reply = RecordingReply::default();

        let res = adapter.handle(post("/", ""), reply.clone()).await.unwrap().unwrap();

        assert_eq!(reply.sends.load(Ordering::SeqCst), 1);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.body().size_hint().exact(), Some(0));
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn streamed_body_is_forwarded_untouched() {
        let adapter = handler_adapter(|_req: Request, _ctx: Context| async {
            let chunks = vec![Ok::<_, std::io::Error>(Bytes::from_static(b"hello"))];
            Response::new(StatusCode::OK, Some(Body::from_stream(stream::iter(chunks))))
        });

        let res = adapter.handle(post("/", ""), HostReply).await.unwrap().unwrap();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn route_context_is_passed_through_as_is() {
        let shared = Context::new();
        shared.insert("tenant", "acme");
        let expected = shared.clone();

        let adapter = HandlerAdapter::new(
            move |_req: Request, ctx: Context| {
                let expected = expected.clone();
                async move { Response::text(StatusCode::OK, ctx.same_as(&expected).to_string()) }
            },
            RouteConfig::named("tenant").with_context(shared),
        );

        let res = adapter.handle(post("/", ""), HostReply).await.unwrap().unwrap();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"true");
    }

    #[tokio::test]
    async fn missing_context_defaults_to_empty() {
        let adapter = handler_adapter(|_req: Request, ctx: Context| async move {
            Response::text(StatusCode::OK, ctx.len().to_string())
        });
        let res = adapter.handle(post("/", ""), HostReply).await.unwrap().unwrap();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"0");
    }

    #[tokio::test]
    async fn upstream_context_extension_is_used() {
        let upstream = Context::new();
        upstream.insert("user", String::from("alice"));

        let adapter = handler_adapter(|_req: Request, ctx: Context| async move {
            let user = ctx.get::<String>("user").map(|u| u.to_string()).unwrap_or_default();
            Response::text(StatusCode::OK, user)
        });

        let mut raw = post("/", "");
        raw.extensions_mut().insert(upstream);
        let res = adapter.handle(raw, HostReply).await.unwrap().unwrap();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"alice");
    }

    #[tokio::test]
    async fn handler_errors_propagate_without_reply() {
        let adapter = handler_adapter(|req: Request, _ctx: Context| async move {
            let _ = req.bytes().await?;
            Err::<Response, _>(HandlerError::other("boom"))
        });
        let reply = RecordingReply::default();

        let err = adapter.handle(post("/", "x"), reply.clone()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(reply.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_reads_raw_body() {
        let adapter = handler_adapter(|req: Request, _ctx: Context| async move {
            let text = req.text().await?;
            Ok::<_, HandlerError>(Response::text(StatusCode::CREATED, text))
        });
        let res = adapter.handle(post("/api/todo/create", r#"{"title":"x"}"#), HostReply).await.unwrap().unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"title":"x"}"#);
    }

    #[test]
    fn unhandled_is_tagged() {
        let res = unhandled();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.extensions().get::<Unhandled>(), Some(&Unhandled));
    }
}
