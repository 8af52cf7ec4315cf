use crate::errors::AppError;
use orders_types::domain::order::{Order, OrderId};
use orders_types::domain::payload::OrderItem;
use orders_types::ports::order_repository::{OrderRepository, RepoError};

pub struct OrderService<R: OrderRepository> {
    repo: R,
}

fn internal(e: RepoError) -> AppError {
    AppError::Internal(anyhow::anyhow!(e.to_string()))
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create_order(
        &self,
        user_id: String,
        items: Vec<OrderItem>,
        total_price: f64,
    ) -> Result<Order, AppError> {
        let order = Order::new(user_id, items, total_price);
        let order = self.repo.create(order).await.map_err(internal)?;
        tracing::info!(order_id = %order.id, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.repo
            .get(id)
            .await
            .map_err(internal)?
            .ok_or_else(AppError::order_not_found)
    }

    pub async fn update_status(&self, id: OrderId, status: String) -> Result<Order, AppError> {
        let updated = self
            .repo
            .update_status(id, status)
            .await
            .map_err(internal)?
            .ok_or_else(AppError::order_not_found)?;
        tracing::info!(order_id = %id, status = %updated.status, "order status updated");
        Ok(updated)
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<(), AppError> {
        let deleted = self.repo.delete(id).await.map_err(internal)?;
        if deleted {
            tracing::info!(order_id = %id, "order deleted");
            Ok(())
        } else {
            Err(AppError::order_not_found())
        }
    }
}
