use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payload::OrderItem;

const ORDER_ID_LEN: usize = 12;

/// Store-assigned order identifier: 12 bytes, rendered as 24 lowercase hex
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId([u8; ORDER_ID_LEN]);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order id {0:?}: expected 24 hex characters")]
pub struct InvalidOrderId(pub String);

impl OrderId {
    /// Seconds-since-epoch prefix followed by eight random bytes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; ORDER_ID_LEN];
        let secs = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    pub fn parse(s: &str) -> Result<Self, InvalidOrderId> {
        if s.len() != ORDER_ID_LEN * 2 {
            return Err(InvalidOrderId(s.to_string()));
        }
        let mut bytes = [0u8; ORDER_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidOrderId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderId {
    type Error = InvalidOrderId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

/// Conventional status values. The wire and store carry status as a free
/// string, so anything a client sends is accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// An order as persisted by the store and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// New record with a fresh id; status and creation time are always set
    /// here, never taken from the client.
    pub fn new(user_id: String, items: Vec<OrderItem>, total_price: f64) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            items,
            total_price,
            status: OrderStatus::Pending.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> OrderItem {
        OrderItem {
            product_id: "p100".into(),
            name: "Test Product".into(),
            price: 50.0,
            quantity: 2,
        }
    }

    #[test]
    fn generated_ids_are_24_lowercase_hex() {
        let id = OrderId::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 24);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(id, OrderId::generate());
    }

    #[test]
    fn parse_accepts_hex_and_rejects_everything_else() {
        let id = OrderId::parse("65fd8a1b1234567890abcd99").unwrap();
        assert_eq!(id.to_string(), "65fd8a1b1234567890abcd99");
        assert_eq!(
            OrderId::parse("65FD8A1B1234567890ABCD99").unwrap(),
            id
        );

        assert!(OrderId::parse("").is_err());
        assert!(OrderId::parse("not-an-id").is_err());
        assert!(OrderId::parse("65fd8a1b1234567890abcd9").is_err());
        assert!(OrderId::parse("65fd8a1b1234567890abcd999").is_err());
        assert!(OrderId::parse("65fd8a1b1234567890abcdzz").is_err());
    }

    #[test]
    fn new_order_defaults_pending_and_serializes_underscore_id() {
        let order = Order::new("user_test_01".into(), vec![item()], 100.0);
        assert_eq!(order.status, "Pending");
        assert!(order.updated_at.is_none());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["_id"], order.id.to_string());
        assert_eq!(json["items"][0]["quantity"], 2);
        assert!(json.get("id").is_none());

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn conventional_statuses_start_at_pending() {
        let names: Vec<_> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        assert_eq!(names, ["Pending", "Processing", "Shipped", "Delivered"]);
        assert_eq!(String::from(OrderStatus::ALL[0]), "Pending");
    }

    #[test]
    fn set_status_accepts_free_form_values() {
        let mut order = Order::new("u".into(), vec![item()], 100.0);
        order.set_status(OrderStatus::Shipped);
        assert_eq!(order.status, "Shipped");
        order.set_status("Returned");
        assert_eq!(order.status, "Returned");
    }
}
