///  To run :
///  cargo r --example client_example
use orders_client::{ApiClient, StatusCode};
use orders_hex::application::order_service::OrderService;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::build_repo;
use orders_types::domain::order::OrderStatus;
use orders_types::domain::payload::{OrderItem, OrderPayload, StatusUpdate};
use serde_json::Value;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("orders.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let repo = build_repo(Some(&db_url)).await?;
    let service = OrderService::new(repo);
    let server = HttpServer::new(
        service,
        HttpServerConfig {
            port: addr.port().to_string(),
        },
    )
    .await?;
    let handle = tokio::spawn(async move {
        server.serve(listener).await.expect("server run");
    });

    // Every call below is logged by the client.
    let client = ApiClient::new(&format!("http://{addr}"))?;
    let payload = OrderPayload::new(
        "example_user",
        vec![OrderItem::new("p100", "Widget", 5.0, 2)],
        10.0,
    )?;
    let created = client.post("/orders", payload).await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = created.json::<Value>()?["_id"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    println!("Created order id={id}");

    let path = format!("/orders/{id}");
    let updated = client
        .put(&path, StatusUpdate::from(OrderStatus::Shipped))
        .await?;
    println!("Updated: {}", updated.text());

    let deleted = client.delete(&path).await?;
    println!("Delete answered {}", deleted.status());

    let gone = client.get(&path).await?;
    println!("Fetch after delete answered {}", gone.status());

    handle.abort();
    Ok(())
}
