//! orders-hex: hexagonal Orders API library (core + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application {
    pub mod order_service;
}

pub use orders_types::{domain, ports};

// HTTP adapter (server + handlers)
pub mod inbound {
    pub mod http {
        mod server;

        pub use server::{HttpServer, HttpServerConfig};
    }
}
