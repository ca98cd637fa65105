// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod http_gateway;
pub mod memory_store;
pub mod rest_config_store;
pub mod session;
