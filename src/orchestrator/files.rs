use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::MappingArtifact;
use crate::notification::Notification;

/// 输入文件大小上限
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// 超过该大小给出处理较慢的提示
pub const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

static MASKED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)-masked(\.[^.]+)$").expect("valid masked-name regex"));

static NAME_WITH_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)(\.[^.]+)$").expect("valid extension regex"));

/// 读入待处理的文本文件
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub name: String,
    pub text: String,
    pub size_bytes: u64,
}

impl InputFile {
    pub fn is_large(&self) -> bool {
        self.size_bytes > LARGE_FILE_BYTES
    }

    /// 大文件提示，在提交前展示
    pub fn large_file_warning(&self) -> Option<Notification> {
        self.is_large()
            .then(|| Notification::warning("Large file detected. Processing may take longer."))
    }
}

/// 读取文本文件；超过 50MB 拒绝，超过 10MB 记录警告
pub async fn read_input_file(path: impl AsRef<Path>) -> Result<InputFile> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| CloudMaskError::file_system(e.to_string(), Some(path.display().to_string())))?;

    let size_bytes = metadata.len();
    if size_bytes > MAX_FILE_BYTES {
        return Err(CloudMaskError::validation("File too large (max 50MB)", Some("file")));
    }
    if size_bytes > LARGE_FILE_BYTES {
        warn!("Large file detected ({} bytes). Processing may take longer.", size_bytes);
    }

    let bytes = fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(InputFile {
        name,
        text: String::from_utf8_lossy(&bytes).into_owned(),
        size_bytes,
    })
}

/// 把映射写成 JSON 侧车文件
pub async fn export_mapping(mapping: &MappingArtifact, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, mapping.to_json_pretty()?).await?;
    info!("Exported mapping with {} entries to {}", mapping.len(), path.display());
    Ok(())
}

/// 读取映射侧车文件
pub async fn load_mapping(path: impl AsRef<Path>) -> Result<MappingArtifact> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .await
        .map_err(|e| CloudMaskError::file_system(e.to_string(), Some(path.display().to_string())))?;
    let mapping = MappingArtifact::from_json(&bytes)?;
    info!("Loaded mapping file {} ({} items)", path.display(), mapping.len());
    Ok(mapping)
}

/// 脱敏输出的建议文件名：`report.log` → `report-masked.log`
pub fn masked_output_name(source: Option<&str>) -> String {
    match source {
        None => "masked-output.txt".to_string(),
        Some(name) => match NAME_WITH_EXTENSION.captures(name) {
            Some(caps) => format!("{}-masked{}", &caps[1], &caps[2]),
            None => format!("{}-masked.txt", name),
        },
    }
}

/// 还原输出的建议文件名
///
/// `X-masked.ext` → `X-unmasked.ext`；其他带扩展名的 → `name-unmasked.ext`；
/// 无扩展名 → `name-unmasked.txt`。
pub fn unmasked_output_name(source: Option<&str>) -> String {
    let Some(name) = source else {
        return "unmasked-output.txt".to_string();
    };

    if let Some(caps) = MASKED_NAME.captures(name) {
        return format!("{}-unmasked{}", &caps[1], &caps[2]);
    }

    match NAME_WITH_EXTENSION.captures(name) {
        Some(caps) => format!("{}-unmasked{}", &caps[1], &caps[2]),
        None => format!("{}-unmasked.txt", name),
    }
}

/// 映射侧车的建议文件名：`report.log` → `report-mapping.json`
pub fn mapping_file_name(source: Option<&str>) -> String {
    match source {
        None => "masked-output-mapping.json".to_string(),
        Some(name) => match NAME_WITH_EXTENSION.captures(name) {
            Some(caps) => format!("{}-mapping.json", &caps[1]),
            None => format!("{}-mapping.json", name),
        },
    }
}
