//! Client-side request bodies for the Orders API.
//!
//! `OrderPayload` is the typed creation body. The builder, `from_value` and
//! deserialization all validate synchronously. Fields are public, so a struct
//! literal or a later mutation is unchecked until `validate` is called.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderStatus;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }
}

fn default_status() -> String {
    OrderStatus::Pending.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawOrderPayload")]
pub struct OrderPayload {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape of [`OrderPayload`] before validation.
#[derive(Deserialize)]
struct RawOrderPayload {
    user_id: String,
    items: Vec<OrderItem>,
    total_price: f64,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawOrderPayload> for OrderPayload {
    type Error = ValidationError;

    fn try_from(raw: RawOrderPayload) -> Result<Self, Self::Error> {
        let payload = Self {
            user_id: raw.user_id,
            items: raw.items,
            total_price: raw.total_price,
            status: raw.status,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        };
        payload.validate()?;
        Ok(payload)
    }
}

impl OrderPayload {
    pub fn new(
        user_id: impl Into<String>,
        items: Vec<OrderItem>,
        total_price: f64,
    ) -> Result<Self, ValidationError> {
        Self::builder()
            .user_id(user_id)
            .items(items)
            .total_price(total_price)
            .build()
    }

    pub fn builder() -> OrderPayloadBuilder {
        OrderPayloadBuilder::default()
    }

    /// Typed view of an untyped mapping. Defaults apply to `status`,
    /// `created_at` and `updated_at`; the remaining fields are required.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::Malformed(
                "expected a JSON object".to_string(),
            ));
        }
        for field in ["user_id", "items", "total_price"] {
            if value.get(field).is_none() {
                return Err(ValidationError::MissingField(field));
            }
        }
        let raw: RawOrderPayload = serde_json::from_value(value)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(invalid("user_id", "must not be blank"));
        }
        check_amount("total_price", self.total_price)?;
        for (i, item) in self.items.iter().enumerate() {
            if item.product_id.trim().is_empty() {
                return Err(invalid(
                    &format!("items[{i}].product_id"),
                    "must not be blank",
                ));
            }
            check_amount(&format!("items[{i}].price"), item.price)?;
            if item.quantity == 0 {
                return Err(invalid(&format!("items[{i}].quantity"), "must be > 0"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn check_amount(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, "must be a finite, non-negative number"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct OrderPayloadBuilder {
    user_id: Option<String>,
    items: Option<Vec<OrderItem>>,
    total_price: Option<f64>,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl OrderPayloadBuilder {
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn item(mut self, item: OrderItem) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    pub fn total_price(mut self, total_price: f64) -> Self {
        self.total_price = Some(total_price);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> Result<OrderPayload, ValidationError> {
        let payload = OrderPayload {
            user_id: self.user_id.ok_or(ValidationError::MissingField("user_id"))?,
            items: self.items.ok_or(ValidationError::MissingField("items"))?,
            total_price: self
                .total_price
                .ok_or(ValidationError::MissingField("total_price"))?,
            status: self.status.unwrap_or_else(default_status),
            // Computed per instance.
            created_at: self.created_at.unwrap_or_else(Utc::now),
            updated_at: None,
        };
        payload.validate()?;
        Ok(payload)
    }
}

/// Body of `PUT /orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
}

impl StatusUpdate {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

impl From<OrderStatus> for StatusUpdate {
    fn from(status: OrderStatus) -> Self {
        Self::new(status)
    }
}
