//! 配置编解码：JSON / YAML 单文件与 tar.gz 批量备份。
//!
//! 解码是宽松的：缺失字段取默认值，未知字段原样保留，
//! 不做任何模式校验（校验交给远端 `/api/validate-config`）。

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::MaskingConfiguration;

pub mod archive;

pub use archive::{archive_member_names, decode_archive, encode_archive, sanitize_file_stem};

static CONFIG_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(json|ya?ml)$").expect("valid extension regex"));

/// 单个配置文件的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// 按文件扩展名选择解码器
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yml" | "yaml" => Ok(ConfigFormat::Yaml),
            _ => Err(CloudMaskError::UnsupportedFormat {
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
        }
    }

    pub fn encode(&self, config: &MaskingConfiguration) -> Result<Vec<u8>> {
        match self {
            ConfigFormat::Json => encode_json(config),
            ConfigFormat::Yaml => encode_yaml(config),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<MaskingConfiguration> {
        match self {
            ConfigFormat::Json => decode_json(bytes),
            ConfigFormat::Yaml => decode_yaml(bytes),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "JSON"),
            ConfigFormat::Yaml => write!(f, "YAML"),
        }
    }
}

/// 编码为两空格缩进的 JSON
pub fn encode_json(config: &MaskingConfiguration) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(config)?)
}

pub fn decode_json(bytes: &[u8]) -> Result<MaskingConfiguration> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn encode_yaml(config: &MaskingConfiguration) -> Result<Vec<u8>> {
    Ok(serde_yaml::to_string(config)?.into_bytes())
}

pub fn decode_yaml(bytes: &[u8]) -> Result<MaskingConfiguration> {
    Ok(serde_yaml::from_slice(bytes)?)
}

/// 导入的配置及建议的保存名称
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedConfig {
    pub suggested_name: String,
    pub format: ConfigFormat,
    pub config: MaskingConfiguration,
}

/// 按扩展名解码导入的文件内容
pub fn decode_import(file_name: &str, bytes: &[u8]) -> Result<ImportedConfig> {
    let format = ConfigFormat::from_path(file_name)?;
    let config = format.decode(bytes)?;

    Ok(ImportedConfig {
        suggested_name: import_name(file_name),
        format,
        config,
    })
}

/// 去掉目录与 `.json`/`.yml`/`.yaml` 后缀得到的配置名
pub fn import_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    CONFIG_EXTENSION.replace(base, "").into_owned()
}

/// 单个配置导出的默认文件名
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("cloudmask-config-{}.json", now.timestamp_millis())
}

/// 批量备份的默认文件名（本地时间，精确到分钟）
pub fn backup_file_name(local_now: NaiveDateTime) -> String {
    format!("cloudmask-configs-backup-{}.tar.gz", local_now.format("%Y%m%d%H%M"))
}
