#![cfg(feature = "sqlite")]

use orders_repo::sqlite::SqliteRepo;
use orders_types::domain::order::{Order, OrderId, OrderStatus};
use orders_types::domain::payload::OrderItem;
use orders_types::ports::order_repository::OrderRepository;
use std::path::PathBuf;

fn temp_db_url() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut path = PathBuf::from(dir.path());
    path.push(format!("orders-{}.db", OrderId::generate()));
    let url = format!("sqlite://{}", path.display());
    (dir, url)
}

fn sample_order() -> Order {
    Order::new(
        "user_test_01".into(),
        vec![
            OrderItem::new("p100", "Test Product", 50.0, 2),
            OrderItem::new("p200", "Other Product", 12.5, 1),
        ],
        112.5,
    )
}

#[tokio::test]
async fn sqlite_repo_crud_flow() {
    let (_dir, url) = temp_db_url();
    let repo = SqliteRepo::new(&url).await.unwrap();
    repo.ping().await.unwrap();

    let order = sample_order();
    let created = repo.create(order.clone()).await.unwrap();
    assert_eq!(created.id, order.id);

    let fetched = repo.get(order.id).await.unwrap().unwrap();
    assert_eq!(fetched, order);

    let updated = repo
        .update_status(order.id, OrderStatus::Delivered.into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "Delivered");
    assert_eq!(updated.created_at, order.created_at);

    let deleted = repo.delete(order.id).await.unwrap();
    assert!(deleted);
    assert!(repo.get(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_repo_handles_missing_rows() {
    let (_dir, url) = temp_db_url();
    let repo = SqliteRepo::new(&url).await.unwrap();
    let missing_id = OrderId::generate();

    let missing = repo.get(missing_id).await.unwrap();
    assert!(missing.is_none());

    let updated = repo
        .update_status(missing_id, "Shipped".into())
        .await
        .unwrap();
    assert!(updated.is_none());

    let deleted = repo.delete(missing_id).await.unwrap();
    assert!(!deleted);
}

#[tokio::test]
async fn second_connection_sees_writes() {
    let (_dir, url) = temp_db_url();
    let writer = SqliteRepo::new(&url).await.unwrap();
    let reader = SqliteRepo::new(&url).await.unwrap();

    let order = writer.create(sample_order()).await.unwrap();
    let seen = reader.get(order.id).await.unwrap().unwrap();
    assert_eq!(seen.user_id, order.user_id);

    reader.close().await;
    writer.close().await;
}
