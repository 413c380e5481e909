//! Portable handler contract.
//!
//! A handler takes a [`Request`] and the request's [`Context`] and either
//! produces a [`Response`] or declines with `None`, letting whatever comes
//! next act on the request.

use std::future::Future;
use std::pin::Pin;

use super::body::{BodyError, BoxError};
use super::context::Context;
use super::request::Request;
use super::response::Response;

/// Outcome of a handler invocation. `Ok(None)` means "not handled here".
pub type HandlerResult = Result<Option<Response>, HandlerError>;

/// Failure raised by a portable handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(#[source] BoxError),
}

impl HandlerError {
    /// Wrap any error raised inside a handler.
    pub fn other(error: impl Into<BoxError>) -> Self {
        HandlerError::Failed(error.into())
    }
}

/// Values a handler may return.
pub trait IntoOutcome {
    fn into_outcome(self) -> HandlerResult;
}

impl IntoOutcome for Response {
    fn into_outcome(self) -> HandlerResult {
        Ok(Some(self))
    }
}

impl IntoOutcome for Option<Response> {
    fn into_outcome(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> HandlerResult {
        Ok(None)
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> HandlerResult {
        self.map_err(Into::into)?.into_outcome()
    }
}

/// A framework-agnostic request handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request, context: Context) -> impl Future<Output = HandlerResult> + Send;
}

impl<F, Fut, Out> Handler for F
where
    F: Fn(Request, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoOutcome,
{
    fn call(&self, request: Request, context: Context) -> impl Future<Output = HandlerResult> + Send {
        let fut = self(request, context);
        async move { fut.await.into_outcome() }
    }
}

/// Adapts a handler that never looks at the context.
#[derive(Debug, Clone)]
pub struct WithoutContext<F>(F);

/// Use `f(request)` as a handler, ignoring the context.
pub fn without_context<F, Fut, Out>(f: F) -> WithoutContext<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoOutcome,
{
    WithoutContext(f)
}

impl<F, Fut, Out> Handler for WithoutContext<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoOutcome,
{
    fn call(&self, request: Request, _context: Context) -> impl Future<Output = HandlerResult> + Send {
        let fut = (self.0)(request);
        async move { fut.await.into_outcome() }
    }
}

/// Adapts a synchronous handler.
#[derive(Debug, Clone)]
pub struct FromSync<F>(F);

/// Use a synchronous `f(request, context)` as a handler.
pub fn from_sync<F, Out>(f: F) -> FromSync<F>
where
    F: Fn(Request, Context) -> Out + Send + Sync + 'static,
    Out: IntoOutcome,
{
    FromSync(f)
}

impl<F, Out> Handler for FromSync<F>
where
    F: Fn(Request, Context) -> Out + Send + Sync + 'static,
    Out: IntoOutcome,
{
    fn call(&self, request: Request, context: Context) -> impl Future<Output = HandlerResult> + Send {
        std::future::ready((self.0)(request, context).into_outcome())
    }
}

type BoxFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// Object-safe view of [`Handler`] so chains can hold mixed handler types.
trait DynHandler: Send + Sync {
    fn call_boxed(&self, request: Request, context: Context) -> BoxFuture<'_>;
}

impl<H: Handler> DynHandler for H {
    fn call_boxed(&self, request: Request, context: Context) -> BoxFuture<'_> {
        Box::pin(self.call(request, context))
    }
}

/// Several handlers registered on one route, tried in order.
///
/// Every handler receives the same request body slot and the same context,
/// so state written by an earlier handler is visible to later ones. The
/// first handler that returns a response wins.
#[derive(Default)]
pub struct Chain {
    handlers: Vec<Box<dyn DynHandler>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the end of the chain.
    pub fn then<H: Handler>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Handler for Chain {
    fn call(&self, request: Request, context: Context) -> impl Future<Output = HandlerResult> + Send {
        async move {
            for handler in &self.handlers {
                if let Some(response) = handler.call_boxed(request.clone(), context.clone()).await? {
                    return Ok(Some(response));
                }
            }
            Ok(None)
        }
    }
}
