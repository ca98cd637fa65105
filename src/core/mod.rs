pub mod home;
pub mod layout;
pub mod pages;
pub mod resolver;
pub mod settings;
pub mod ticker;

pub use crate::domain::model::{Article, CategoryNewsMap, LayoutBlock, Page};
pub use crate::domain::ports::{ConfigProvider, ConfigStore, ContentGateway};
pub use crate::utils::error::Result;
