//! orders-types: domain model and ports shared by the Orders service, its
//! store adapters, and the API test harness.

pub mod domain {
    pub mod order;
    pub mod payload;
}

pub mod ports {
    pub mod order_repository;
}
