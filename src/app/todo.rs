//! Todo creation endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::StatusCode;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::portable::{BodyError, Context, Handler, HandlerError, Request, Response};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// In-memory todo list shared by the API and the pages.
#[derive(Debug)]
pub struct TodoStore {
    items: RwLock<Vec<Todo>>,
    next_id: AtomicU64,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, title: impl Into<String>) -> Todo {
        let todo = Todo {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            title: title.into(),
            completed: false,
        };
        self.items.write().push(todo.clone());
        todo
    }

    /// Snapshot in creation order.
    pub fn list(&self) -> Vec<Todo> {
        self.items.read().clone()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct NewTodo {
    title: String,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Result<Response, HandlerError> {
    Ok(Response::json(
        status,
        &ApiError {
            error: message.into(),
        },
    )?)
}

/// `POST /api/todo/create`: `{"title": ".."}` → `201` with the new todo.
pub fn create_todo(store: Arc<TodoStore>) -> impl Handler {
    move |request: Request, _context: Context| {
        let store = Arc::clone(&store);
        async move {
            let input: NewTodo = match request.json().await {
                Ok(input) => input,
                Err(BodyError::Json(e)) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
                Err(e) => return Err(e.into()),
            };

            let title = input.title.trim();
            if title.is_empty() {
                return api_error(StatusCode::UNPROCESSABLE_ENTITY, "title must not be blank");
            }

            let todo = store.create(title);
            tracing::info!(id = todo.id, "Todo created");
            Ok(Response::json(StatusCode::CREATED, &todo)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn post(body: &'static str) -> Request {
        Request::builder()
            .method(Method::POST)
            .url("http://localhost/api/todo/create".parse().unwrap())
            .body(body)
    }

    async fn call(store: &Arc<TodoStore>, body: &'static str) -> Response {
        create_todo(Arc::clone(store))
            .call(post(body), Context::new())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn creates_todo() {
        let store = Arc::new(TodoStore::new());
        let res = call(&store, r#"{"title":"  buy milk "}"#).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let todo: Todo = serde_json::from_slice(&res.into_body().collect().await.unwrap()).unwrap();
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
        assert_eq!(store.list(), vec![todo]);
    }

    #[tokio::test]
    async fn ids_increase() {
        let store = TodoStore::new();
        let a = store.create("a");
        let b = store.create("b");
        assert!(b.id > a.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn blank_title_is_unprocessable() {
        let store = Arc::new(TodoStore::new());
        let res = call(&store, r#"{"title":"   "}"#).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let store = Arc::new(TodoStore::new());
        let res = call(&store, "{").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn consumed_body_is_an_error() {
        let req = post(r#"{"title":"x"}"#);
        let _ = req.bytes().await.unwrap();
        let err = create_todo(Arc::new(TodoStore::new()))
            .call(req, Context::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Body(BodyError::AlreadyConsumed)));
    }
}
