//! Server-rendered pages.
//!
//! Renders the index (the todo list) and any registered static page.
//! Everything else is declined so the request ends as unhandled.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use http::{Method, StatusCode};

use crate::app::todo::TodoStore;
use crate::portable::{Context, Handler, HandlerResult, Request, Response};

#[derive(Debug, Clone)]
struct Page {
    title: String,
    body: String,
}

/// Page renderer for `GET`/`HEAD` requests.
#[derive(Debug, Clone)]
pub struct Pages {
    store: Arc<TodoStore>,
    pages: HashMap<String, Page>,
}

impl Pages {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self {
            store,
            pages: HashMap::new(),
        }
    }

    /// Register a static page. `body` is trusted HTML.
    pub fn page(mut self, path: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(
            path.into(),
            Page {
                title: title.into(),
                body: body.into(),
            },
        );
        self
    }

    fn render(&self, path: &str) -> Option<String> {
        if path == "/" {
            let mut list = String::from("<ul>");
            for todo in self.store.list() {
                let _ = write!(list, "<li data-id=\"{}\">{}</li>", todo.id, escape(&todo.title));
            }
            list.push_str("</ul>");
            return Some(document("Todos", &list));
        }
        self.pages
            .get(path)
            .map(|page| document(&escape(&page.title), &page.body))
    }
}

impl Handler for Pages {
    fn call(&self, request: Request, _context: Context) -> impl Future<Output = HandlerResult> + Send {
        let html = match *request.method() {
            Method::GET | Method::HEAD => self.render(request.path()),
            _ => None,
        };
        async move { Ok(html.map(|html| Response::html(StatusCode::OK, html))) }
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{body}</body></html>"
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
