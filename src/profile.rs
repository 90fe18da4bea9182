//! 配置编辑：组装当前工作配置，并通过存储与编解码完成保存、导入导出和备份。

use std::sync::Arc;

use tracing::{info, warn};

use crate::codec::{self, ConfigFormat, ImportedConfig};
use crate::engine::MaskingEngine;
use crate::harness::PatternTestHarness;
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::{CustomPattern, MaskingConfiguration, PatternTestResult, SavedConfigEntry, SavedConfigSummary};
use crate::notification::Notification;
use crate::storage::ConfigurationStore;

/// 批量备份结果
#[derive(Debug, Clone, PartialEq)]
pub enum BackupOutcome {
    Archive { bytes: Vec<u8>, count: usize },
    /// 没有已保存的配置，不生成空归档
    NothingToBackup,
}

impl BackupOutcome {
    pub fn notification(&self) -> Notification {
        match self {
            BackupOutcome::Archive { count, .. } => {
                Notification::success(format!("Backed up {} configuration(s)", count))
            }
            BackupOutcome::NothingToBackup => Notification::warning("No configurations to backup"),
        }
    }
}

/// 配置编辑器
pub struct ProfileEditor {
    store: ConfigurationStore,
    engine: Arc<dyn MaskingEngine>,
    harness: PatternTestHarness,
    config: MaskingConfiguration,
    selected: Option<String>,
}

impl ProfileEditor {
    pub fn new(store: ConfigurationStore, engine: Arc<dyn MaskingEngine>) -> Self {
        Self {
            store,
            harness: PatternTestHarness::new(engine.clone()),
            engine,
            config: MaskingConfiguration::default(),
            selected: None,
        }
    }

    /// 当前工作配置
    pub fn config(&self) -> &MaskingConfiguration {
        &self.config
    }

    pub fn set_config(&mut self, config: MaskingConfiguration) {
        self.config = config;
    }

    /// 当前选中的已保存配置名
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// 添加公司名；空白输入被忽略
    pub fn add_company_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.config.company_names.push(name.to_string());
        true
    }

    pub fn remove_company_name(&mut self, index: usize) -> Option<String> {
        (index < self.config.company_names.len()).then(|| self.config.company_names.remove(index))
    }

    /// 添加自定义模式；名称和正则都必填，重名不拒绝
    pub fn add_custom_pattern(&mut self, name: &str, pattern: &str) -> Result<()> {
        let (name, pattern) = required_pattern(name, pattern)?;

        if self.config.custom_patterns.iter().any(|p| p.name == name) {
            warn!("Custom pattern name \"{}\" is already used", name);
        }
        self.config.custom_patterns.push(CustomPattern::new(name, pattern));
        Ok(())
    }

    /// 先用引擎试跑模式，通过后再加入配置
    pub async fn add_custom_pattern_checked(
        &mut self,
        name: &str,
        pattern: &str,
        sample_text: &str,
    ) -> Result<PatternTestResult> {
        let (name, pattern) = required_pattern(name, pattern)?;
        let result = self.harness.test(pattern, sample_text).await?;
        self.add_custom_pattern(name, pattern)?;
        Ok(result)
    }

    pub fn remove_custom_pattern(&mut self, index: usize) -> Option<CustomPattern> {
        (index < self.config.custom_patterns.len()).then(|| self.config.custom_patterns.remove(index))
    }

    /// 正则调试
    pub async fn test_pattern(&self, pattern: &str, text: &str) -> Result<PatternTestResult> {
        self.harness.test(pattern, text).await
    }

    /// 交给远端校验当前配置，错误详情原样返回
    pub async fn validate(&self) -> Result<()> {
        self.engine.validate_config(&self.config).await?;
        info!("Configuration is valid");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<SavedConfigSummary>> {
        self.store.list().await
    }

    /// 以指定名称保存当前工作配置并选中
    pub async fn save_as(&mut self, name: &str) -> Result<SavedConfigEntry> {
        let entry = self.store.save(name, &self.config).await?;
        self.selected = Some(entry.name.clone());
        Ok(entry)
    }

    /// 载入已保存的配置作为工作配置
    pub async fn load(&mut self, name: &str) -> Result<SavedConfigEntry> {
        let entry = self
            .store
            .load(name)
            .await?
            .ok_or_else(|| CloudMaskError::NotFound {
                name: name.to_string(),
            })?;

        self.config = entry.config.clone();
        self.selected = Some(entry.name.clone());
        Ok(entry)
    }

    /// 删除配置；删除的是当前选中项时清除选中
    pub async fn delete(&mut self, name: &str) -> Result<()> {
        self.store.delete(name).await?;
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        }
        Ok(())
    }

    /// 导入文件内容作为工作配置，返回建议的保存名称
    pub fn import(&mut self, file_name: &str, bytes: &[u8]) -> Result<ImportedConfig> {
        let imported = codec::decode_import(file_name, bytes)?;
        self.config = imported.config.clone();
        info!("Imported {} configuration from {}", imported.format, file_name);
        Ok(imported)
    }

    /// 导出当前工作配置
    pub fn export(&self, format: ConfigFormat) -> Result<Vec<u8>> {
        format.encode(&self.config)
    }

    /// 把所有已保存配置打包
    pub async fn backup(&self) -> Result<BackupOutcome> {
        let entries = self.store.entries().await?;
        if entries.is_empty() {
            return Ok(BackupOutcome::NothingToBackup);
        }

        let bytes = codec::encode_archive(&entries)?;
        Ok(BackupOutcome::Archive {
            bytes,
            count: entries.len(),
        })
    }

    /// 从备份归档恢复，返回恢复的配置名（按归档顺序）
    ///
    /// 归档先完整解码，再一次写入存储；任何一步失败都不改动已有配置。
    pub async fn restore(&self, archive: &[u8]) -> Result<Vec<String>> {
        let decoded = codec::decode_archive(archive)?;
        let saved = self.store.save_all(&decoded).await?;
        info!("Restored {} configuration(s) from backup", saved.len());
        Ok(decoded.into_iter().map(|(name, _)| name).collect())
    }
}

fn required_pattern<'a>(name: &'a str, pattern: &'a str) -> Result<(&'a str, &'a str)> {
    let (name, pattern) = (name.trim(), pattern.trim());
    if name.is_empty() || pattern.is_empty() {
        return Err(CloudMaskError::validation(
            "Pattern name and regex are required",
            Some(if name.is_empty() { "name" } else { "pattern" }),
        ));
    }
    Ok((name, pattern))
}
