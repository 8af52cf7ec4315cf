use async_trait::async_trait;

use crate::domain::order::{Order, OrderId};

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),
}

/// Point operations on the order collection, keyed by [`OrderId`].
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, order: Order) -> Result<Order, RepoError>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError>;
    /// Sets `status` only. `None` when no record matched.
    async fn update_status(&self, id: OrderId, status: String)
        -> Result<Option<Order>, RepoError>;
    /// `false` when nothing was deleted.
    async fn delete(&self, id: OrderId) -> Result<bool, RepoError>;
    /// Liveness probe.
    async fn ping(&self) -> Result<(), RepoError>;
}
