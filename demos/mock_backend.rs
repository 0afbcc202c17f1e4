//! Pretend backend service for trying the gateway locally.
//!
//! `cargo run --example mock_backend -- users 9001`

use axum::{extract::Path, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let service = args.next().unwrap_or_else(|| "users".to_string());
    let port: u16 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(9001);

    let name = service.clone();
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/", get(move || list(name.clone())))
        .route("/{id}", get(move |Path(id): Path<u64>| get_one(service.clone(), id)));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Mock backend listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list(service: String) -> Json<Value> {
    Json(json!([
        { "id": 1, "service": service, "name": "first" },
        { "id": 2, "service": service, "name": "second" },
    ]))
}

async fn get_one(service: String, id: u64) -> Json<Value> {
    Json(json!({ "id": id, "service": service, "name": format!("record {id}") }))
}
