use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use once_cell::sync::Lazy;
use regex::Regex;
use tar::{Archive, Builder, Header};
use tracing::{debug, warn};

use super::{decode_json, encode_json};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::{MaskingConfiguration, SavedConfigEntry};

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid sanitize regex"));

/// 把配置名中 `[A-Za-z0-9]` 之外的每个字符替换为 `_`
pub fn sanitize_file_stem(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "_").into_owned()
}

/// 为每个条目分配归档内文件名
///
/// 清洗后重名时按出现顺序追加数字后缀：`Prod_AWS.json`、`Prod_AWS_2.json`……
/// 后缀本身若已被占用则继续递增。
pub fn archive_member_names(entries: &[SavedConfigEntry]) -> Vec<String> {
    let mut used = HashSet::new();
    let mut names = Vec::with_capacity(entries.len());

    for entry in entries {
        let stem = sanitize_file_stem(&entry.name);
        let mut candidate = format!("{}.json", stem);
        let mut suffix = 2;

        while used.contains(&candidate) {
            candidate = format!("{}_{}.json", stem, suffix);
            suffix += 1;
        }

        if suffix > 2 {
            warn!(
                "Archive file name for \"{}\" collided, stored as {}",
                entry.name, candidate
            );
        }

        used.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

/// 把多个已保存配置打包为 tar.gz，每个配置一个 JSON 文件
pub fn encode_archive(entries: &[SavedConfigEntry]) -> Result<Vec<u8>> {
    if entries.is_empty() {
        return Err(CloudMaskError::empty_input("No configurations to backup"));
    }

    let names = archive_member_names(entries);
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (entry, name) in entries.iter().zip(&names) {
        let content = encode_json(&entry.config)?;

        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(entry.created_at.timestamp().max(0) as u64);
        header.set_cksum();

        builder
            .append_data(&mut header, name, content.as_slice())
            .map_err(|e| archive_error(format!("Failed to add {}: {}", name, e)))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| archive_error(format!("Failed to finish archive: {}", e)))?;
    let bytes = encoder
        .finish()
        .map_err(|e| archive_error(format!("Failed to compress archive: {}", e)))?;

    debug!("Encoded {} configurations into {} bytes", entries.len(), bytes.len());
    Ok(bytes)
}

/// 读取备份归档，返回 (配置名, 配置)；配置名取文件名去掉 `.json`
pub fn decode_archive(bytes: &[u8]) -> Result<Vec<(String, MaskingConfiguration)>> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let mut restored = Vec::new();

    let entries = archive
        .entries()
        .map_err(|e| archive_error(format!("Failed to read archive: {}", e)))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_error(format!("Corrupt archive entry: {}", e)))?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| archive_error(format!("Invalid entry path: {}", e)))?
            .into_owned();

        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            debug!("Skipping non-JSON archive member {}", path.display());
            continue;
        }

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;

        let name = member_stem(&path);
        let config = decode_json(&content)?;
        restored.push((name, config));
    }

    Ok(restored)
}

fn member_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn archive_error(message: String) -> CloudMaskError {
    CloudMaskError::Parsing {
        message,
        content_type: "archive".to_string(),
    }
}
