use std::sync::Arc;

use tracing::{debug, error, info};

use super::providers::{StorageProvider, StorageType};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::{MaskingConfiguration, SavedConfigEntry, SavedConfigSummary};

/// 命名配置存储
///
/// 每次变更都基于最新快照做读-改-写，没有锁，后写者胜出。
/// 单用户单会话环境下这就是全部一致性保证。
#[derive(Clone)]
pub struct ConfigurationStore {
    provider: Arc<dyn StorageProvider>,
}

impl ConfigurationStore {
    /// 创建新的配置存储
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    pub fn storage_type(&self) -> StorageType {
        self.provider.storage_type()
    }

    /// 列出配置元数据，按插入顺序
    pub async fn list(&self) -> Result<Vec<SavedConfigSummary>> {
        let entries = self.provider.read_entries().await?;
        debug!("Listing {} saved configurations", entries.len());
        Ok(entries.iter().map(SavedConfigEntry::summary).collect())
    }

    /// 读取全部条目（用于备份）
    pub async fn entries(&self) -> Result<Vec<SavedConfigEntry>> {
        self.provider.read_entries().await
    }

    /// 保存配置；同名条目被整体替换并移到末尾
    pub async fn save(&self, name: &str, config: &MaskingConfiguration) -> Result<SavedConfigEntry> {
        if name.trim().is_empty() {
            return Err(CloudMaskError::validation("Config name is required", Some("name")));
        }

        let entry = SavedConfigEntry::new(name, config.clone());

        let mut entries = self.provider.read_entries().await?;
        let replaced = entries.iter().any(|e| e.name == name);
        entries.retain(|e| e.name != name);
        entries.push(entry.clone());

        match self.provider.write_entries(&entries).await {
            Ok(()) => {
                if replaced {
                    info!("Replaced saved configuration \"{}\"", name);
                } else {
                    info!("Saved configuration \"{}\"", name);
                }
                Ok(entry)
            }
            Err(e) => {
                error!("Failed to save configuration \"{}\": {}", name, e);
                Err(e)
            }
        }
    }

    /// 批量保存（恢复备份用），一次写入
    ///
    /// 任一名称为空时整体拒绝，存储保持原样。
    pub async fn save_all(&self, items: &[(String, MaskingConfiguration)]) -> Result<Vec<SavedConfigEntry>> {
        if let Some((name, _)) = items.iter().find(|(name, _)| name.trim().is_empty()) {
            error!("Rejecting batch save with blank name {:?}", name);
            return Err(CloudMaskError::validation("Config name is required", Some("name")));
        }

        let mut entries = self.provider.read_entries().await?;
        let mut saved = Vec::with_capacity(items.len());
        for (name, config) in items {
            let entry = SavedConfigEntry::new(name.as_str(), config.clone());
            entries.retain(|e| e.name != entry.name);
            entries.push(entry.clone());
            saved.push(entry);
        }

        self.provider.write_entries(&entries).await?;
        info!("Saved {} configurations in one batch", saved.len());
        Ok(saved)
    }

    /// 按名称读取；不存在时返回 `None`
    pub async fn load(&self, name: &str) -> Result<Option<SavedConfigEntry>> {
        let entries = self.provider.read_entries().await?;
        let found = entries.into_iter().find(|e| e.name == name);

        if found.is_none() {
            debug!("Configuration \"{}\" not found", name);
        }
        Ok(found)
    }

    /// 删除配置；名称不存在时什么也不做
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut entries = self.provider.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.name != name);

        if entries.len() == before {
            debug!("Delete of unknown configuration \"{}\" ignored", name);
            return Ok(());
        }

        self.provider.write_entries(&entries).await.map_err(|e| {
            error!("Failed to delete configuration \"{}\": {}", name, e);
            e
        })?;
        info!("Deleted configuration \"{}\"", name);
        Ok(())
    }

    /// 健康检查
    pub async fn health_check(&self) -> bool {
        match self.provider.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!("Health check failed for {:?}: {}", self.storage_type(), e);
                false
            }
        }
    }
}
