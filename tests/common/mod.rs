//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_gateway::config::loader::active_routes;
use api_gateway::config::schema::RouteConfig;
use api_gateway::config::GatewayConfig;
use api_gateway::discovery::ServiceRegistry;
use api_gateway::http::HttpServer;
use api_gateway::lifecycle::Shutdown;
use api_gateway::routing::{RouteTable, SharedRouteTable};
use axum::http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What a mock backend sends back.
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Start a backend that answers every request with `f(raw_request)`.
pub async fn start_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let reply = f(request).await;
                        let _ = socket.write_all(render(&reply).as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Backend that returns the raw request it received as the body.
///
/// Also sets a few hop-by-hop headers on the response so tests can check
/// they never reach the client.
pub async fn start_echo_backend() -> SocketAddr {
    start_backend(|request| async move {
        Reply::new(200, request)
            .header("X-Backend", "echo")
            .header("Keep-Alive", "timeout=5")
            .header("Proxy-Authenticate", "Basic")
    })
    .await
}

/// Backend that sends headers and part of the body, then stalls.
pub async fn start_stalling_backend(stall: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                let head = concat!(
                    "HTTP/1.1 200 OK\r\n",
                    "Content-Length: 100\r\n",
                    "Connection: close\r\n\r\n",
                    "partial"
                );
                let _ = socket.write_all(head.as_bytes()).await;
                tokio::time::sleep(stall).await;
            });
        }
    });

    addr
}

/// A port nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A running gateway and the handles tests need.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub routes: Arc<SharedRouteTable>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        let _ = self.shutdown.trigger();
    }
}

/// Start a gateway on an ephemeral port.
pub async fn start_gateway(
    records: Vec<RouteConfig>,
    registry: Option<Arc<dyn ServiceRegistry>>,
    upstream_secs: u64,
) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.timeouts.upstream_secs = upstream_secs;

    let table = RouteTable::from_records(&active_routes(records)).unwrap();
    let routes = Arc::new(SharedRouteTable::new(table));
    let server = HttpServer::new(&config, Arc::clone(&routes), registry);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway {
        addr,
        routes,
        shutdown,
    }
}

pub fn route(id: i64, pattern: &str, service: &str, target: &str) -> RouteConfig {
    RouteConfig {
        id,
        path_pattern: pattern.into(),
        service_name: service.into(),
        method: "ANY".into(),
        auth_required: false,
        rate_limit: 0,
        cache_ttl: 0,
        target_url: target.into(),
        enabled: true,
    }
}

pub fn gateway_route(id: i64, pattern: &str) -> RouteConfig {
    let mut record = route(id, pattern, "gateway", "");
    record.method = "GET".into();
    record
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        if let Some(end) = find_head_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let wanted = end + 4 + content_length(&head);
            while buf.len() < wanted {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            return String::from_utf8_lossy(&buf).into_owned();
        }

        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).into_owned(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn render(reply: &Reply) -> String {
    let reason = StatusCode::from_u16(reply.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");

    let mut out = format!("HTTP/1.1 {} {}\r\n", reply.status, reason);
    for (name, value) in &reply.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.body.len(),
        reply.body
    ));
    out
}
