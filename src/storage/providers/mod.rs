use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::error::Result;
use crate::models::SavedConfigEntry;

pub mod file;
pub mod memory;

pub use file::FileStorageProvider;
pub use memory::MemoryStorageProvider;

/// 固定的存储键，文件存储以此命名
pub const STORAGE_KEY: &str = "cloudmask_configs";

/// 存储类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    File,
    Memory,
}

/// 存储提供商 trait
///
/// 提供商只负责整体读写已保存配置集合；
/// 增删改的读-改-写逻辑在 `ConfigurationStore` 中完成。
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// 获取存储类型
    fn storage_type(&self) -> StorageType;

    /// 读取最新的集合快照，按插入顺序
    async fn read_entries(&self) -> Result<Vec<SavedConfigEntry>>;

    /// 整体替换集合
    async fn write_entries(&self, entries: &[SavedConfigEntry]) -> Result<()>;

    /// 健康检查
    async fn health_check(&self) -> Result<bool> {
        self.read_entries().await.map(|_| true)
    }
}
