use orders_hex::application::order_service::OrderService;
use orders_hex::config::Config;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::{build_repo, Repo};
use tracing_subscriber::filter::FromEnvError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "debug";

/// `RUST_LOG` when it is set and parses, otherwise [`DEFAULT_LOG_FILTER`].
fn log_filter(from_env: Result<EnvFilter, FromEnvError>) -> EnvFilter {
    from_env.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // DATABASE_URL / SERVER_PORT may come from .env.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::try_from_default_env()))
        .init();

    let config = Config::from_env()?;
    match config.database_url.as_deref() {
        Some(url) => tracing::info!("Order store: {url}"),
        None => tracing::info!("Order store: in-memory"),
    }
    let repo: Repo = build_repo(config.database_url.as_deref()).await?;

    let http = HttpServer::new(
        OrderService::new(repo),
        HttpServerConfig {
            port: config.server_port.clone(),
        },
    )
    .await?;
    http.run().await
}
