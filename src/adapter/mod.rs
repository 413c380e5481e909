//! Host ↔ portable adapter.
//!
//! # Data Flow
//! ```text
//! axum route
//!     → handler.rs (HandlerAdapter: context, invoke, branch)
//!         → request.rs (RequestAdapter: host request → portable Request)
//!         → portable Handler
//!         → reply.rs (Reply: portable Response → host response)
//! ```
//!
//! # Design Decisions
//! - One adapter per route registration; no state shared across requests
//!   beyond what the route configuration explicitly carries
//! - Declining is not an error: the reply is simply never invoked

pub mod handler;
pub mod reply;
pub mod request;

pub use handler::{handler_adapter, unhandled, HandlerAdapter, RouteConfig, RouteHandler, Unhandled};
pub use reply::{into_host_response, HostReply, Reply};
pub use request::{create_request_adapter, RequestAdapter};
