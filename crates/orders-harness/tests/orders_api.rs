//! Orders API scenarios. Runs with its own `main` so the session (store
//! connection, API client, local service) is built once for all cases.

use std::process::ExitCode;

use orders_client::StatusCode;
use orders_harness::{
    filter_from_args, new_order_payload, HarnessConfig, OrErrored, Suite, TestSession,
    NONEXISTENT_ORDER_ID,
};
use orders_types::domain::order::OrderStatus;
use orders_types::domain::payload::StatusUpdate;
use serde_json::{json, Value};

const MALFORMED_ORDER_ID: &str = "not-a-valid-id";

async fn test_create_order(session: TestSession) {
    let payload = new_order_payload();
    let response = session.api().post("/orders", payload.clone()).await.or_errored();
    assert_eq!(response.status(), StatusCode::CREATED);
    let data: Value = response.json().unwrap();
    let order_id = data["_id"].as_str().unwrap().to_string();

    session
        .with_teardown(order_id, |s, order_id| async move {
            // API response
            assert_eq!(data["user_id"], payload.user_id.as_str());
            assert_eq!(data["total_price"], payload.total_price);

            // Store consistency
            let record = s.stored_order(&order_id).await.expect("order persisted");
            assert_eq!(record.status, "Pending");
        })
        .await;
}

async fn test_create_order_ignores_client_status(session: TestSession) {
    let raw = json!({
        "user_id": "user_test_02",
        "items": [{"product_id": "p200", "name": "Raw Product", "price": 10.0, "quantity": 3}],
        "total_price": 30.0,
        "status": "Delivered"
    });
    let response = session.api().post("/orders", raw).await.or_errored();
    assert_eq!(response.status(), StatusCode::CREATED);
    let data: Value = response.json().unwrap();
    let order_id = data["_id"].as_str().unwrap().to_string();

    session
        .with_teardown(order_id, |s, order_id| async move {
            assert_eq!(data["status"], "Pending");
            let record = s.stored_order(&order_id).await.expect("order persisted");
            assert_eq!(record.status, "Pending");
            assert_eq!(record.user_id, "user_test_02");
        })
        .await;
}

async fn test_get_order(session: TestSession) {
    let payload = new_order_payload();
    let expected = payload.clone();
    session
        .with_created_order(payload, |s, order_id| async move {
            let response = s.api().get(&format!("/orders/{order_id}")).await.or_errored();
            assert_eq!(response.status(), StatusCode::OK);
            let data: Value = response.json().unwrap();
            assert_eq!(data["_id"], order_id.as_str());
            assert_eq!(data["user_id"], expected.user_id.as_str());
            assert_eq!(data["items"], serde_json::to_value(&expected.items).unwrap());
            assert_eq!(data["total_price"], expected.total_price);
            assert_eq!(data["status"], "Pending");
        })
        .await;
}

async fn test_update_order_status(session: TestSession, new_status: OrderStatus) {
    session
        .with_created_order(new_order_payload(), move |s, order_id| async move {
            let response = s
                .api()
                .put(&format!("/orders/{order_id}"), StatusUpdate::from(new_status))
                .await
                .or_errored();
            assert_eq!(response.status(), StatusCode::OK);
            let data: Value = response.json().unwrap();
            assert_eq!(data["status"], new_status.as_str());

            let record = s.stored_order(&order_id).await.expect("order persisted");
            assert_eq!(record.status, new_status.as_str());
        })
        .await;
}

async fn test_delete_order(session: TestSession) {
    session
        .with_created_order(new_order_payload(), |s, order_id| async move {
            let path = format!("/orders/{order_id}");
            let response = s.api().delete(&path).await.or_errored();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);

            assert!(s.stored_order(&order_id).await.is_none());

            let response = s.api().get(&path).await.or_errored();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let response = s.api().delete(&path).await.or_errored();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        })
        .await;
}

async fn test_update_non_existent_order(session: TestSession) {
    let response = session
        .api()
        .put(
            &format!("/orders/{NONEXISTENT_ORDER_ID}"),
            json!({"status": "Shipped"}),
        )
        .await
        .or_errored();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn test_malformed_id_is_rejected(session: TestSession) {
    let path = format!("/orders/{MALFORMED_ORDER_ID}");
    let api = session.api();

    let response = api.get(&path).await.or_errored();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = api.put(&path, StatusUpdate::new("Shipped")).await.or_errored();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = api.delete(&path).await.or_errored();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn test_order_lifecycle(session: TestSession) {
    let body = json!({
        "user_id": "user_test_01",
        "items": [{"product_id": "p100", "name": "Test Product", "price": 50.0, "quantity": 2}],
        "total_price": 100.0
    });
    let response = session.api().post("/orders", body).await.or_errored();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = response.json::<Value>().unwrap()["_id"]
        .as_str()
        .unwrap()
        .to_string();

    session
        .with_teardown(order_id, |s, order_id| async move {
            let path = format!("/orders/{order_id}");
            let record = s.stored_order(&order_id).await.expect("order persisted");
            assert_eq!(record.status, "Pending");

            let response = s.api().put(&path, json!({"status": "Shipped"})).await.or_errored();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.json::<Value>().unwrap()["status"], "Shipped");

            let response = s.api().delete(&path).await.or_errored();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);

            let response = s.api().get(&path).await.or_errored();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        })
        .await;
}

fn suite() -> Suite {
    Suite::new()
        .case("test_create_order", &["smoke", "api"], test_create_order)
        .case(
            "test_create_order_ignores_client_status",
            &["api"],
            test_create_order_ignores_client_status,
        )
        .case("test_get_order", &["api"], test_get_order)
        .parametrized(
            "test_update_order_status",
            &["api"],
            OrderStatus::ALL
                .into_iter()
                .filter(|s| *s != OrderStatus::Pending),
            test_update_order_status,
        )
        .case("test_delete_order", &["api"], test_delete_order)
        .case(
            "test_update_non_existent_order",
            &["negative", "api"],
            test_update_non_existent_order,
        )
        .case(
            "test_malformed_id_is_rejected",
            &["negative", "api"],
            test_malformed_id_is_rejected,
        )
        .case("test_order_lifecycle", &["smoke", "api"], test_order_lifecycle)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = filter_from_args(std::env::args());

    let session = match HarnessConfig::from_env() {
        Ok(config) => TestSession::connect(&config).await,
        Err(e) => Err(e),
    };
    let session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("test session setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = suite().run(&session, filter.as_deref()).await;
    report.log_summary();
    session.close().await;
    report.exit_code()
}
