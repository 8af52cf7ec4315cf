use std::future::Future;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use orders_client::{ApiClient, StatusCode};
use orders_hex::application::order_service::OrderService;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::memory::InMemoryRepo;
use orders_repo::{build_repo, Repo};
use orders_types::domain::order::{Order, OrderId, OrderStatus};
use orders_types::domain::payload::{OrderItem, OrderPayload};
use orders_types::ports::order_repository::OrderRepository;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::HarnessConfig;
use crate::errors::SetupError;
use crate::logging::init_logging;
use crate::runner::raise_error;

/// Well-formed id that no store will ever have issued.
pub const NONEXISTENT_ORDER_ID: &str = "65fd8a1b1234567890abcd99";

const HEALTH_ATTEMPTS: u32 = 20;
const HEALTH_BACKOFF: Duration = Duration::from_millis(25);

/// A fresh, valid creation payload.
pub fn new_order_payload() -> OrderPayload {
    OrderPayload::builder()
        .user_id("user_test_01")
        .item(OrderItem::new("p100", "Test Product", 50.0, 2))
        .total_price(100.0)
        .status(OrderStatus::Pending)
        .build()
        .expect("fixture payload is valid")
}

/// The Orders service running on an ephemeral local port.
pub struct LocalService {
    base_url: String,
    handle: JoinHandle<()>,
}

impl LocalService {
    pub async fn start(repo: Repo) -> Result<Self, SetupError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| SetupError::Service(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| SetupError::Service(e.to_string()))?;
        let config = HttpServerConfig {
            port: addr.port().to_string(),
        };
        let server = HttpServer::new(OrderService::new(repo), config)
            .await
            .map_err(|e| SetupError::Service(e.to_string()))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                tracing::error!("local service stopped: {e}");
            }
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for LocalService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Session-scoped context handed to every case. Clones share the same
/// client, store connection and local service.
#[derive(Clone)]
pub struct TestSession {
    api: ApiClient,
    store: Repo,
    local: Option<Arc<LocalService>>,
    _scratch: Option<Arc<TempDir>>,
}

impl TestSession {
    /// Connects to the store (and fails fast if it does not answer a ping),
    /// starts the local service when no API URL is configured, and binds the
    /// API client.
    pub async fn connect(config: &HarnessConfig) -> Result<Self, SetupError> {
        init_logging();

        let (database_url, scratch) = match &config.database_url {
            Some(url) => (url.clone(), None),
            None => {
                let dir = tempfile::tempdir().map_err(|e| SetupError::Store(e.to_string()))?;
                let url = format!("sqlite://{}", dir.path().join("orders.db").display());
                (url, Some(Arc::new(dir)))
            }
        };

        tracing::info!("Connecting to order store at {database_url}...");
        let store = connect_store(&database_url).await.map_err(|e| {
            tracing::error!("Failed to connect to order store: {e}");
            e
        })?;
        tracing::info!("Order store connection successful.");

        let (base_url, local) = match &config.api_url {
            Some(url) => (url.clone(), None),
            None => {
                let server_store = connect_store(&database_url).await?;
                let local = LocalService::start(server_store).await?;
                tracing::info!("Started local orders service at {}", local.base_url());
                (local.base_url().to_string(), Some(Arc::new(local)))
            }
        };

        let mut builder = ApiClient::builder(&base_url)?;
        if let Some(timeout) = config.http_timeout {
            builder = builder.with_timeout(timeout);
        }
        let api = builder.build()?;
        if local.is_some() {
            wait_for_health(&api).await?;
        }
        Ok(Self {
            api,
            store,
            local,
            _scratch: scratch,
        })
    }

    /// Session over an existing client and store; nothing is started.
    pub fn from_parts(api: ApiClient, store: Repo) -> Self {
        Self {
            api,
            store,
            local: None,
            _scratch: None,
        }
    }

    /// Local service and verifier sharing one in-memory store.
    pub async fn in_memory() -> Result<Self, SetupError> {
        init_logging();
        let repo = InMemoryRepo::new();
        let local = LocalService::start(Repo::from(repo.clone())).await?;
        let api = ApiClient::new(local.base_url())?;
        wait_for_health(&api).await?;
        Ok(Self {
            api,
            store: Repo::from(repo),
            local: Some(Arc::new(local)),
            _scratch: None,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &Repo {
        &self.store
    }

    /// Reads an order straight from the store, bypassing the API.
    ///
    /// # Panics
    ///
    /// If `id` is not a valid order id or the store read fails.
    pub async fn stored_order(&self, id: &str) -> Option<Order> {
        let id = OrderId::parse(id).unwrap_or_else(|e| panic!("{e}"));
        self.store
            .get(id)
            .await
            .unwrap_or_else(|e| panic!("store read for {id} failed: {e}"))
    }

    /// POSTs `payload` and returns the new order's id.
    ///
    /// # Panics
    ///
    /// Errors the case (see [`raise_error`]) unless the service answers 201
    /// with an `_id`.
    pub async fn create_order(&self, payload: OrderPayload) -> String {
        let response = self
            .api
            .post("/orders", payload)
            .await
            .unwrap_or_else(|e| raise_error(format!("setup: POST /orders failed: {e}")));
        if response.status() != StatusCode::CREATED {
            raise_error(format!(
                "setup: POST /orders answered {} (expected 201): {}",
                response.status(),
                response.text()
            ));
        }
        let body: serde_json::Value = response.json().unwrap_or_else(|e| {
            raise_error(format!("setup: POST /orders returned a non-JSON body: {e}"))
        });
        body.get("_id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                raise_error(format!("setup: POST /orders response has no `_id`: {body}"))
            })
    }

    /// Creates an order from `payload`, runs `body` with its id, and deletes
    /// it afterwards whatever the outcome.
    pub async fn with_created_order<F, Fut>(&self, payload: OrderPayload, body: F)
    where
        F: FnOnce(TestSession, String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Setup: Creating order...");
        let order_id = self.create_order(payload).await;
        self.with_teardown(order_id, body).await;
    }

    /// Runs `body`, then deletes `order_id` on every exit path. A panic in
    /// `body` is re-raised after the delete; a failed delete is only logged.
    pub async fn with_teardown<F, Fut>(&self, order_id: String, body: F)
    where
        F: FnOnce(TestSession, String) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let outcome = tokio::spawn(body(self.clone(), order_id.clone())).await;
        self.teardown(&order_id).await;
        if let Err(err) = outcome {
            if err.is_panic() {
                panic::resume_unwind(err.into_panic());
            }
            raise_error(format!("test body did not complete: {err}"));
        }
    }

    async fn teardown(&self, order_id: &str) {
        tracing::info!("Teardown: Deleting order {order_id}...");
        match self.api.delete(&format!("/orders/{order_id}")).await {
            Ok(res) if res.status().is_success() => {}
            Ok(res) => tracing::warn!(
                "Teardown: delete of {order_id} answered {}",
                res.status()
            ),
            Err(e) => tracing::warn!("Teardown: delete of {order_id} failed: {e}"),
        }
    }

    /// Stops the local service and releases the store connection.
    pub async fn close(self) {
        if let Some(local) = &self.local {
            local.shutdown();
        }
        self.store.close().await;
        tracing::info!("Session closed.");
    }
}

/// Polls `GET /health` until the service answers 200.
pub(crate) async fn wait_for_health(api: &ApiClient) -> Result<(), SetupError> {
    let mut last = String::new();
    for _ in 0..HEALTH_ATTEMPTS {
        match api.get("/health").await {
            Ok(res) if res.status() == StatusCode::OK => return Ok(()),
            Ok(res) => last = format!("/health answered {}", res.status()),
            Err(e) => last = e.to_string(),
        }
        tokio::time::sleep(HEALTH_BACKOFF).await;
    }
    tracing::error!("Service at {} never became healthy: {last}", api.base_url());
    Err(SetupError::Service(format!(
        "{} not healthy after {HEALTH_ATTEMPTS} attempts: {last}",
        api.base_url()
    )))
}

async fn connect_store(database_url: &str) -> Result<Repo, SetupError> {
    let store = build_repo(Some(database_url))
        .await
        .map_err(|e| SetupError::Store(format!("{database_url}: {e}")))?;
    store
        .ping()
        .await
        .map_err(|e| SetupError::Store(format!("{database_url}: {e}")))?;
    Ok(store)
}
