use serde::{Deserialize, Serialize};

use super::mapping::MappingArtifact;

/// 文本变换结果（不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub transformed_text: String,
    pub items_affected: usize,
    pub processing_time_ms: f64,
}

pub type MaskOperationResult = OperationResult;
pub type UnmaskOperationResult = OperationResult;

/// 脱敏结果与还原所需的映射
#[derive(Debug, Clone, PartialEq)]
pub struct MaskOutcome {
    pub result: MaskOperationResult,
    pub mapping: MappingArtifact,
}

/// 正则测试结果；零匹配不是错误
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternTestResult {
    pub matches: Vec<String>,
}

impl PatternTestResult {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}
