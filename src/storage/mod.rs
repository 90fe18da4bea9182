pub mod manager;
pub mod providers;

pub use manager::ConfigurationStore;
pub use providers::{FileStorageProvider, MemoryStorageProvider, StorageProvider, StorageType, STORAGE_KEY};
