use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StorageProvider, StorageType};
use crate::infrastructure::error::Result;
use crate::models::SavedConfigEntry;

/// 进程内存储，用于测试和临时会话
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    entries: RwLock<Vec<SavedConfigEntry>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<SavedConfigEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }

    async fn read_entries(&self) -> Result<Vec<SavedConfigEntry>> {
        Ok(self.entries.read().await.clone())
    }

    async fn write_entries(&self, entries: &[SavedConfigEntry]) -> Result<()> {
        *self.entries.write().await = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaskingConfiguration;

    #[tokio::test]
    async fn test_memory_provider_read_write() {
        let provider = MemoryStorageProvider::new();
        assert_eq!(provider.storage_type(), StorageType::Memory);
        assert!(provider.read_entries().await.unwrap().is_empty());

        let entries = vec![SavedConfigEntry::new("a", MaskingConfiguration::default())];
        provider.write_entries(&entries).await.unwrap();
        assert_eq!(provider.read_entries().await.unwrap(), entries);
        assert!(provider.health_check().await.unwrap());
    }
}
