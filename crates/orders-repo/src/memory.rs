use async_trait::async_trait;
use dashmap::DashMap;
use orders_types::domain::order::{Order, OrderId};
use orders_types::ports::order_repository::{OrderRepository, RepoError};
use std::sync::Arc;

/// Clones share the same map, so a server and a verifier can hold one each.
#[derive(Clone)]
pub struct InMemoryRepo {
    pub map: Arc<DashMap<OrderId, Order>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn create(&self, order: Order) -> Result<Order, RepoError> {
        self.map.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        Ok(self.map.get(&id).map(|r| r.clone()))
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: String,
    ) -> Result<Option<Order>, RepoError> {
        if let Some(mut v) = self.map.get_mut(&id) {
            v.set_status(status);
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepoError> {
        Ok(self.map.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
