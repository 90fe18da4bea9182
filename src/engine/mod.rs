use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::error::Result;
use crate::models::{CustomPattern, MappingArtifact, MaskingConfiguration, PatternTestResult};

pub mod http;

pub use http::HttpMaskingEngine;

/// 外部脱敏引擎 trait，对应 `/api/*` 四个端点
#[async_trait]
pub trait MaskingEngine: Send + Sync {
    /// 获取引擎名称
    fn name(&self) -> &str;

    /// `POST /api/mask`
    async fn mask(&self, request: &MaskRequest) -> Result<MaskResponse>;

    /// `POST /api/unmask`
    async fn unmask(&self, request: &UnmaskRequest) -> Result<UnmaskResponse>;

    /// `POST /api/test-regex`
    async fn test_regex(&self, request: &RegexTestRequest) -> Result<PatternTestResult>;

    /// `POST /api/validate-config`
    async fn validate_config(&self, config: &MaskingConfiguration) -> Result<()>;
}

/// 脱敏请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskRequest {
    pub text: String,
    pub patterns: Vec<CustomPattern>,
    /// 完整配置快照（种子、开关、公司名）
    pub config: MaskingConfiguration,
}

impl MaskRequest {
    /// 从配置快照构建请求
    pub fn new(text: impl Into<String>, config: &MaskingConfiguration) -> Self {
        Self {
            text: text.into(),
            patterns: config.custom_patterns.clone(),
            config: config.clone(),
        }
    }
}

/// 脱敏响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskResponse {
    pub masked_text: String,
    pub items_masked: usize,
    pub processing_time_ms: f64,
    pub mapping: MappingArtifact,
}

/// 还原请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmaskRequest {
    pub text: String,
    pub mapping: MappingArtifact,
}

/// 还原响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmaskResponse {
    pub unmasked_text: String,
    pub items_unmasked: usize,
    pub processing_time_ms: f64,
}

/// 正则测试请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexTestRequest {
    pub pattern: String,
    pub text: String,
}
