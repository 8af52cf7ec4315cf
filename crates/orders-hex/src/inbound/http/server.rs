use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::errors::AppError;
use orders_types::domain::order::{Order, OrderId};
use orders_types::domain::payload::OrderItem;
use orders_types::ports::order_repository::OrderRepository;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

#[derive(Clone)]
pub struct HttpServer<R>
where
    R: OrderRepository,
{
    pub service: Arc<OrderService<R>>,
    pub config: HttpServerConfig,
}

/// Client-supplied `status`/`created_at` are not part of this shape and are
/// dropped on deserialization.
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize)]
struct UpdateStatusResponse {
    status: String,
    message: &'static str,
}

fn parse_id(raw: &str) -> Result<OrderId, AppError> {
    OrderId::parse(raw).map_err(|_| AppError::invalid_id())
}

impl<R> HttpServer<R>
where
    R: OrderRepository + Send + Sync + 'static,
{
    pub async fn new(service: OrderService<R>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/orders", post(create_order::<R>))
            .route(
                "/orders/{id}",
                get(get_order::<R>)
                    .put(update_status::<R>)
                    .delete(delete_order::<R>),
            )
            .layer(trace_layer)
            .with_state(self.service.clone())
    }

    /// Binds `0.0.0.0:<port>` and serves until the task is dropped.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        tracing::info!("starting server on {}", listener.local_addr()?);
        let app = self.router();
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn create_order<R>(
    State(service): State<Arc<OrderService<R>>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let order = service
        .create_order(payload.user_id, payload.items, payload.total_price)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order<R>(
    State(service): State<Arc<OrderService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let order = service.get_order(id).await?;
    Ok(Json(order))
}

async fn update_status<R>(
    State(service): State<Arc<OrderService<R>>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let updated = service.update_status(id, payload.status).await?;
    Ok(Json(UpdateStatusResponse {
        status: updated.status,
        message: "Updated successfully",
    }))
}

async fn delete_order<R>(
    State(service): State<Arc<OrderService<R>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    service.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
