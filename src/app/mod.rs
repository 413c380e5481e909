//! Demo application served through the adapter.
//!
//! # Routes
//! - `POST /api/todo/create` → [`create_todo`]
//! - everything else → [`Pages`], which declines what it cannot render

pub mod pages;
pub mod todo;

use std::sync::Arc;

use axum::routing::MethodFilter;

use crate::adapter::{HandlerAdapter, RouteConfig};
use crate::http::Routes;

pub use pages::Pages;
pub use todo::{create_todo, Todo, TodoStore};

/// Route table for the demo application.
pub fn routes(store: Arc<TodoStore>) -> Routes {
    let pages = Pages::new(Arc::clone(&store)).page(
        "/about",
        "About",
        "<p>Rendered on the server, hydrated on the client.</p>",
    );

    Routes::new(HandlerAdapter::new(pages, RouteConfig::named("pages")).into_route()).exact(
        MethodFilter::POST,
        "/api/todo/create",
        HandlerAdapter::new(create_todo(store), RouteConfig::named("todo-create")).into_route(),
    )
}
