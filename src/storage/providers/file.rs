use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{StorageProvider, StorageType, STORAGE_KEY};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::SavedConfigEntry;

/// JSON 文件存储：`<data_dir>/cloudmask_configs.json`
#[derive(Debug, Clone)]
pub struct FileStorageProvider {
    path: PathBuf,
}

impl FileStorageProvider {
    /// 在数据目录下使用固定存储键
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    /// 直接指定文件路径
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageProvider for FileStorageProvider {
    fn storage_type(&self) -> StorageType {
        StorageType::File
    }

    async fn read_entries(&self) -> Result<Vec<SavedConfigEntry>> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CloudMaskError::file_system(
                    e.to_string(),
                    Some(self.path.display().to_string()),
                ))
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&content).map_err(|e| {
            CloudMaskError::storage(format!(
                "Saved configurations at {} are corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_entries(&self, entries: &[SavedConfigEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_vec_pretty(entries)?;

        // 先写临时文件再改名，中途失败不会留下半截文件
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &content).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!("Wrote {} saved configurations to {}", entries.len(), self.path.display());
        Ok(())
    }
}
