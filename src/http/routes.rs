//! Route registration.
//!
//! # Responsibilities
//! - Register exact method+path routes ahead of the catch-all
//! - Register the catch-all on `/` and `/{*path}` for every method
//!
//! # Design Decisions
//! - axum matches static paths before wildcards, so exact routes always win
//! - An exact route falls back to the catch-all for methods it does not
//!   serve, instead of answering `405`

use axum::routing::{any, on, MethodFilter};
use axum::Router;

use crate::adapter::RouteHandler;

/// Route table: exact routes plus one catch-all.
#[derive(Debug, Clone)]
pub struct Routes {
    exact: Vec<(String, MethodFilter, RouteHandler)>,
    catch_all: RouteHandler,
}

impl Routes {
    /// Start a table whose unmatched requests go to `catch_all`.
    pub fn new(catch_all: RouteHandler) -> Self {
        Self {
            exact: Vec::new(),
            catch_all,
        }
    }

    /// Register `handler` for `method` on exactly `path`.
    pub fn exact(mut self, method: MethodFilter, path: impl Into<String>, handler: RouteHandler) -> Self {
        self.exact.push((path.into(), method, handler));
        self
    }

    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for (path, method, handler) in self.exact {
            tracing::debug!(path = %path, method = ?method, "Registering exact route");
            router = router.route(
                &path,
                on(method, handler).fallback(self.catch_all.clone()),
            );
        }
        router
            .route("/", any(self.catch_all.clone()))
            .route("/{*path}", any(self.catch_all))
    }
}
