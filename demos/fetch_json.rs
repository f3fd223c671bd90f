//! Fetch a JSON document and print it.
//!
//! Run with: RUST_LOG=typed_rest=debug cargo run --example fetch_json -- httpbin.org

use tracing_subscriber::EnvFilter;
use typed_rest::client::{ClientConfig, ReqwestTransport, RestClient};
use typed_rest::{Endpoint, QueryParameter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hostname = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "httpbin.org".to_string());

    println!("Typed REST fetch example");
    println!("========================\n");
    println!("GET https://{hostname}/get");

    let config = ClientConfig::new(hostname).with_header("Accept", "application/json");
    let client = RestClient::with_transport(config, ReqwestTransport::new()?);

    let endpoint = Endpoint::get("/get").with_query(QueryParameter::new("source", "typed_rest"));
    let document: serde_json::Value = client.request_json(&endpoint).await?;

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
