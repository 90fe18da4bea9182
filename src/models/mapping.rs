use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::infrastructure::error::{CloudMaskError, Result};

/// 一次脱敏操作产生的映射（原始标识 → 替换令牌）
///
/// 对本 crate 不透明：不合并、不比对、不做部分应用，
/// 还原时按原样交回引擎。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingArtifact(Map<String, Value>);

impl MappingArtifact {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(entries)
    }

    /// 解析映射文件内容，只接受 JSON 对象
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            _ => Err(CloudMaskError::Parsing {
                message: "Invalid mapping file format".to_string(),
                content_type: "JSON".to_string(),
            }),
        }
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.0)?)
    }

    /// 映射条目数
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 查询某个原始标识对应的令牌
    pub fn token_for(&self, original: &str) -> Option<&str> {
        self.0.get(original).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object() {
        let mapping = MappingArtifact::from_json(br#"{"vpc-0a1b2c3d": "vpc-9f8e7d6c"}"#).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.token_for("vpc-0a1b2c3d"), Some("vpc-9f8e7d6c"));
        assert_eq!(mapping.token_for("vpc-missing"), None);
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        for input in [&b"[1, 2]"[..], b"\"text\"", b"not json at all"] {
            let err = MappingArtifact::from_json(input).unwrap_err();
            assert_eq!(err.user_message(), "JSON parse error: Invalid mapping file format");
        }
    }

    #[test]
    fn test_pretty_json_reparses_identically() {
        let mapping = MappingArtifact::from_json(br#"{"a": "b", "c": {"nested": true}}"#).unwrap();
        let bytes = mapping.to_json_pretty().unwrap();
        assert_eq!(MappingArtifact::from_json(&bytes).unwrap(), mapping);
    }
}
