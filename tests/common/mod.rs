//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use universal_entry::config::{EntryConfig, Mode};
use universal_entry::{EntryServer, Routes, Shutdown};

/// Run `routes` on an ephemeral port. The server stops when the returned
/// `Shutdown` is triggered or dropped.
pub async fn spawn_server(config: EntryConfig, routes: Routes) -> (SocketAddr, Shutdown) {
    let server = EntryServer::new(config, routes).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Production config serving static files from `root/client`.
#[allow(dead_code)]
pub fn production_config(root: &std::path::Path) -> EntryConfig {
    let mut config = EntryConfig::default();
    config.mode = Mode::Production;
    config.assets.root = root.to_path_buf();
    config.assets.client_dir = "client".into();
    config
}

/// Development config pointing at a dev asset server on `dev`.
#[allow(dead_code)]
pub fn development_config(dev: SocketAddr) -> EntryConfig {
    let mut config = EntryConfig::default();
    config.mode = Mode::Development;
    config.assets.dev_server_url = format!("http://{}", dev);
    config
}

/// A throwaway client directory holding `files`.
#[allow(dead_code)]
pub fn client_dir(files: &[(&str, &str)]) -> std::path::PathBuf {
    let root = std::env::temp_dir().join(format!("entry-it-{}", uuid::Uuid::new_v4()));
    for (path, content) in files {
        let path = root.join("client").join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    std::fs::create_dir_all(root.join("client")).unwrap();
    root
}

/// Start a mock dev asset server: `/@vite/client` answers with `body`,
/// every other path is a 404.
#[allow(dead_code)]
pub async fn start_mock_dev_server(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 2048];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let found = head.starts_with("GET /@vite/client ");

                        let response = if found {
                            format!(
                                "HTTP/1.1 200 OK\r\nContent-Type: text/javascript\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                body.len(),
                                body
                            )
                        } else {
                            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
                        };
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Client that never pools connections, so each test request is isolated.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
