//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use s3_proxy::config::{ProxyConfig, StorageConfig};
use s3_proxy::{HttpServer, S3Store, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned backend answer.
pub struct MockReply {
    pub status_line: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

impl MockReply {
    pub fn new(status_line: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_line,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// Request heads (request line + headers) seen by the mock, lowercased.
pub type Recorded = Arc<Mutex<Vec<String>>>;

/// Start a mock S3 endpoint that answers every request with `reply()`.
pub async fn start_mock_s3<F>(reply: F) -> (SocketAddr, Recorded)
where
    F: Fn() -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let seen = recorded.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let reply = reply.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        seen.lock().unwrap().push(head.to_ascii_lowercase());

                        let MockReply {
                            status_line,
                            headers,
                            body,
                        } = reply();
                        let mut response = format!("HTTP/1.1 {}\r\n", status_line);
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str(&format!(
                            "Content-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        ));

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start the proxy against an S3 endpoint using static test credentials.
pub async fn start_proxy(endpoint: SocketAddr) -> (SocketAddr, Shutdown) {
    let sdk_config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("AKIDTEST", "test-secret", None, None, "test"))
        .endpoint_url(format!("http://{}", endpoint))
        .force_path_style(true)
        .build();

    let config = ProxyConfig::default();
    let client = aws_sdk_s3::Client::from_conf(sdk_config);
    let store = S3Store::new(client, &StorageConfig::default()).unwrap();
    let server = HttpServer::new(&config, Arc::new(store));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that talks straight to the proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
