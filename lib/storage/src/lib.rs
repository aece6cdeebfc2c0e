pub mod manager;
pub mod store;

pub use manager::{IndexManager, StorageConfig, DEFAULT_CATALOG_PATH, DEFAULT_INDEX_PATH};
pub use store::{IndexStore, FORMAT_VERSION};
