//! Asset middleware mounted ahead of the routes.
//!
//! # Responsibilities
//! - Production: serve built client files from disk
//! - Development: forward asset requests to the dev asset server
//! - Hand every request they cannot answer on to the routes
//!
//! # Design Decisions
//! - Only GET and HEAD are ever answered here
//! - No directory listings; `..` and absolute components are rejected
//! - An unreachable dev server is not an error, the request just moves on

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body as HostBody;
use axum::extract::{Request as HostRequest, State};
use axum::http::uri::{InvalidUri, PathAndQuery};
use axum::http::{header, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::Response as HostResponse;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::config::{EntryConfig, Mode};

/// Collaborator contract for middleware that may answer a raw request.
///
/// `Ok` short-circuits with a response; `Err` hands the request back
/// untouched so the next layer can act on it.
pub trait AssetMiddleware: Send + Sync + 'static {
    fn serve(&self, request: HostRequest) -> impl Future<Output = Result<HostResponse, HostRequest>> + Send;
}

fn is_read(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Serves files that exist under a base directory.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    base_dir: PathBuf,
}

impl StaticAssets {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.base_dir.clone();
        for component in Path::new(url_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path)
    }

    async fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let path = self.map_path(url_path)?;
        let meta = tokio::fs::metadata(&path).await.ok()?;
        if meta.is_file() {
            return Some(path);
        }
        if meta.is_dir() {
            let index = path.join("index.html");
            if tokio::fs::metadata(&index).await.map(|m| m.is_file()).unwrap_or(false) {
                return Some(index);
            }
        }
        None
    }
}

impl AssetMiddleware for StaticAssets {
    fn serve(&self, request: HostRequest) -> impl Future<Output = Result<HostResponse, HostRequest>> + Send {
        async move {
            if !is_read(request.method()) {
                return Err(request);
            }
            let Some(path) = self.resolve(request.uri().path()).await else {
                return Err(request);
            };

            tracing::trace!(path = %path.display(), "Serving static asset");
            match ServeFile::new(path).oneshot(request).await {
                Ok(response) => Ok(response.map(HostBody::new)),
                Err(never) => match never {},
            }
        }
    }
}

/// Forwards asset requests to a development asset server.
#[derive(Debug, Clone)]
pub struct DevAssets {
    upstream: Uri,
    client: Client<HttpConnector, HostBody>,
}

impl DevAssets {
    /// `upstream` is the dev server base URL, e.g. `http://127.0.0.1:5173`.
    pub fn new(upstream: Uri) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { upstream, client }
    }

    pub fn upstream(&self) -> &Uri {
        &self.upstream
    }

    fn upstream_uri(&self, original: &Uri) -> Option<Uri> {
        let mut parts = self.upstream.clone().into_parts();
        parts.path_and_query = Some(
            original
                .path_and_query()
                .cloned()
                .unwrap_or_else(|| PathAndQuery::from_static("/")),
        );
        Uri::from_parts(parts).ok()
    }
}

impl AssetMiddleware for DevAssets {
    fn serve(&self, request: HostRequest) -> impl Future<Output = Result<HostResponse, HostRequest>> + Send {
        async move {
            if !is_read(request.method()) {
                return Err(request);
            }
            let Some(uri) = self.upstream_uri(request.uri()) else {
                return Err(request);
            };

            let mut forward = axum::http::Request::new(HostBody::empty());
            *forward.method_mut() = request.method().clone();
            *forward.uri_mut() = uri;
            *forward.headers_mut() = request.headers().clone();
            forward.headers_mut().remove(header::HOST);

            match self.client.request(forward).await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => Err(request),
                Ok(response) => Ok(response.map(HostBody::new)),
                Err(e) => {
                    tracing::debug!(upstream = %self.upstream, error = %e, "Dev asset server unavailable");
                    Err(request)
                }
            }
        }
    }
}

/// The asset middleware selected by the run mode.
#[derive(Debug, Clone)]
pub enum Assets {
    Static(StaticAssets),
    Dev(DevAssets),
}

impl Assets {
    /// Static files from `<root>/<client_dir>` in production, the dev
    /// asset server otherwise.
    pub fn from_config(config: &EntryConfig) -> Result<Self, InvalidUri> {
        Ok(match config.mode {
            Mode::Production => Assets::Static(StaticAssets::new(config.assets.client_path())),
            Mode::Development => Assets::Dev(DevAssets::new(config.assets.dev_server_url.parse()?)),
        })
    }
}

impl AssetMiddleware for Assets {
    fn serve(&self, request: HostRequest) -> impl Future<Output = Result<HostResponse, HostRequest>> + Send {
        async move {
            match self {
                Assets::Static(assets) => assets.serve(request).await,
                Assets::Dev(assets) => assets.serve(request).await,
            }
        }
    }
}

/// axum middleware: let the assets answer first, otherwise continue.
pub async fn serve_assets<A: AssetMiddleware>(
    State(assets): State<Arc<A>>,
    request: HostRequest,
    next: Next,
) -> HostResponse {
    match assets.serve(request).await {
        Ok(response) => response,
        Err(request) => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    fn request(method: Method, uri: &str) -> HostRequest {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(HostBody::empty())
            .unwrap()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("universal-entry-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("assets")).unwrap();
        std::fs::write(dir.join("assets/app.js"), "console.log(1)").unwrap();
        std::fs::write(dir.join("index.html"), "<html></html>").unwrap();
        dir
    }

    #[tokio::test]
    async fn static_serves_existing_file() {
        let dir = temp_dir();
        let assets = StaticAssets::new(&dir);

        let res = assets.serve(request(Method::GET, "/assets/app.js")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"console.log(1)");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn static_serves_directory_index() {
        let dir = temp_dir();
        let res = StaticAssets::new(&dir).serve(request(Method::GET, "/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn static_passes_on_missing_files_and_writes() {
        let dir = temp_dir();
        let assets = StaticAssets::new(&dir);

        let missing = assets.serve(request(Method::GET, "/nope.css")).await;
        assert_eq!(missing.unwrap_err().uri().path(), "/nope.css");

        let post = assets.serve(request(Method::POST, "/assets/app.js")).await;
        assert!(post.is_err());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn static_rejects_traversal() {
        let assets = StaticAssets::new("/srv/client");
        assert!(assets.map_path("/../etc/passwd").is_none());
        assert_eq!(
            assets.map_path("/./a/b.js"),
            Some(PathBuf::from("/srv/client/a/b.js"))
        );
    }

    async fn spawn_dev_server() -> Uri {
        let app = Router::new().route("/@client", get(|| async { "dev client" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}", addr).parse().unwrap()
    }

    #[tokio::test]
    async fn dev_forwards_known_assets() {
        let assets = DevAssets::new(spawn_dev_server().await);
        let res = assets.serve(request(Method::GET, "/@client")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"dev client");
    }

    #[tokio::test]
    async fn dev_passes_on_not_found() {
        let assets = DevAssets::new(spawn_dev_server().await);
        let back = assets.serve(request(Method::GET, "/page?x=1")).await.unwrap_err();
        assert_eq!(back.uri(), "/page?x=1");
    }

    #[tokio::test]
    async fn dev_passes_on_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let assets = DevAssets::new(format!("http://{}", addr).parse().unwrap());
        assert!(assets.serve(request(Method::GET, "/x")).await.is_err());
    }
}
