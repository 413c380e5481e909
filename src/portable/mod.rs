//! Portable request/response model.
//!
//! Handlers written against this module know nothing about the host server.
//!
//! # Data Flow
//! ```text
//! adapter (host request)
//!     → request.rs (method, url, headers, once-readable body)
//!     → handler.rs (Handler::call(request, context))
//!     → response.rs (status, headers, always-present body)
//!     → adapter (host reply)
//! ```
//!
//! # Design Decisions
//! - Context is passed explicitly to every handler, never looked up
//! - A response body is never absent; "nothing" is an empty stream

pub mod body;
pub mod context;
pub mod handler;
pub mod request;
pub mod response;

pub use body::{Body, BodyError, BoxError};
pub use context::{Context, ContextKey, Symbol};
pub use handler::{
    from_sync, without_context, Chain, FromSync, Handler, HandlerError, HandlerResult, IntoOutcome,
    WithoutContext,
};
pub use request::{Request, RequestBuilder};
pub use response::{normalize_body, Response, ResponseBuilder};
