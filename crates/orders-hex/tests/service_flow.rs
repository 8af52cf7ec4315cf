use orders_hex::application::order_service::OrderService;
use orders_hex::errors::AppError;
use orders_repo::memory::InMemoryRepo;
use orders_types::domain::order::OrderStatus;
use orders_types::domain::payload::OrderItem;

// End-to-end service flow against the in-memory adapter.
#[tokio::test]
async fn create_update_delete_flow() {
    let repo = InMemoryRepo::new();
    let svc = OrderService::new(repo.clone());

    let order = svc
        .create_order(
            "eve".into(),
            vec![OrderItem::new("p300", "Gadget", 7.0, 3)],
            21.0,
        )
        .await
        .unwrap();
    assert_eq!(repo.map.len(), 1);

    for status in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = svc.update_status(order.id, status.into()).await.unwrap();
        assert_eq!(updated.status, status.as_str());
    }

    svc.delete_order(order.id).await.unwrap();
    assert!(repo.map.is_empty());
    assert!(matches!(
        svc.get_order(order.id).await,
        Err(AppError::NotFound(_))
    ));
}
