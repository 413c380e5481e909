//! Universal HTTP entry point.
//!
//! Runs framework-agnostic `(Request, Context) -> Option<Response>` handlers
//! on an axum server.

// Portable model and the bridge to the host
pub mod adapter;
pub mod portable;

// Host server
pub mod http;

// Application
pub mod app;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use adapter::{handler_adapter, HandlerAdapter, RouteConfig};
pub use config::schema::EntryConfig;
pub use http::{EntryServer, Routes};
pub use lifecycle::Shutdown;
pub use portable::{Body, Context, Handler, Request, Response};
