pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::PortalConfig;

pub use adapters::{
    http_gateway::HttpContentGateway, memory_store::MemoryConfigStore,
    rest_config_store::RestConfigStore, session::Session,
};
pub use core::{
    home::{HomeController, HomeModel},
    layout::LayoutManager,
    pages::PageController,
    resolver::LayoutBlockResolver,
    settings::SettingsRepository,
    ticker::RotationTimer,
};
pub use utils::error::{PortalError, Result};
