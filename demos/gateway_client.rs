//! Exercise a running gateway from the outside.
//!
//! `cargo run --example gateway_client -- http://127.0.0.1:8000`

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let client = reqwest::Client::new();

    for path in ["/health", "/routes", "/api/users", "/api/products/1", "/nope"] {
        let res = client.get(format!("{base}{path}")).send().await?;
        println!("GET {path} -> {}", res.status());
        println!("{}\n", res.text().await?);
    }

    let res = client.get(format!("{base}/api/orders")).send().await?;
    println!("GET /api/orders without Authorization -> {}", res.status());

    let res = client
        .get(format!("{base}/api/orders"))
        .bearer_auth("demo-token")
        .send()
        .await?;
    println!("GET /api/orders with Authorization -> {}", res.status());

    Ok(())
}
