use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{MaskRequest, MaskResponse, MaskingEngine, RegexTestRequest, UnmaskRequest, UnmaskResponse};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::{MaskingConfiguration, PatternTestResult};

/// 通过 HTTP 访问的脱敏引擎
pub struct HttpMaskingEngine {
    client: Arc<reqwest::Client>,
    base_url: String,
}

/// 引擎错误响应，`detail` 可能是字符串或校验错误列表
#[derive(Debug, Deserialize)]
struct EngineErrorResponse {
    detail: Value,
}

/// `GET /health` 响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineHealth {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

/// 端点失败时使用的错误类型及兜底文案
#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Mask,
    Unmask,
    TestRegex,
    ValidateConfig,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Mask => "/api/mask",
            Endpoint::Unmask => "/api/unmask",
            Endpoint::TestRegex => "/api/test-regex",
            Endpoint::ValidateConfig => "/api/validate-config",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            Endpoint::Mask => "Masking failed",
            Endpoint::Unmask => "Unmasking failed",
            Endpoint::TestRegex => "Regex test failed",
            Endpoint::ValidateConfig => "Configuration validation failed",
        }
    }

    fn engine_error(&self, message: String) -> CloudMaskError {
        match self {
            Endpoint::TestRegex => CloudMaskError::PatternEngine { message },
            _ => CloudMaskError::MaskingEngine { message },
        }
    }
}

impl HttpMaskingEngine {
    /// 创建新的 HTTP 引擎客户端
    pub fn new(client: Arc<reqwest::Client>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 检查引擎服务状态
    pub async fn health(&self) -> Result<EngineHealth> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CloudMaskError::Network {
                message: format!("Health check returned {}", response.status()),
                url: Some(url),
            });
        }

        Ok(response.json().await?)
    }

    async fn send_raw<B: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &B) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!("Engine returned {} for {}", status, endpoint.path());
            return Err(endpoint.engine_error(extract_detail(&response_text, endpoint)));
        }

        Ok(response_text)
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response_text = self.send_raw(endpoint, body).await?;

        serde_json::from_str(&response_text).map_err(|e| CloudMaskError::Parsing {
            message: format!("Unexpected response from {}: {}", endpoint.path(), e),
            content_type: "JSON".to_string(),
        })
    }
}

/// 取出错误响应中的 `detail`，不做任何改写
fn extract_detail(response_text: &str, endpoint: Endpoint) -> String {
    match serde_json::from_str::<EngineErrorResponse>(response_text) {
        Ok(EngineErrorResponse {
            detail: Value::String(detail),
        }) if !detail.is_empty() => detail,
        Ok(EngineErrorResponse { detail }) if !detail.is_null() => detail.to_string(),
        _ => endpoint.fallback_message().to_string(),
    }
}

#[async_trait]
impl MaskingEngine for HttpMaskingEngine {
    fn name(&self) -> &str {
        "http"
    }

    async fn mask(&self, request: &MaskRequest) -> Result<MaskResponse> {
        self.post_json(Endpoint::Mask, request).await
    }

    async fn unmask(&self, request: &UnmaskRequest) -> Result<UnmaskResponse> {
        self.post_json(Endpoint::Unmask, request).await
    }

    async fn test_regex(&self, request: &RegexTestRequest) -> Result<PatternTestResult> {
        self.post_json(Endpoint::TestRegex, request).await
    }

    async fn validate_config(&self, config: &MaskingConfiguration) -> Result<()> {
        self.send_raw(Endpoint::ValidateConfig, config).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let engine = HttpMaskingEngine::new(Arc::new(reqwest::Client::new()), "http://localhost:8000/");
        assert_eq!(engine.base_url(), "http://localhost:8000");
        assert_eq!(engine.name(), "http");
    }

    #[test]
    fn test_extract_detail_string() {
        let detail = extract_detail(r#"{"detail": "Invalid regex: missing )"}"#, Endpoint::TestRegex);
        assert_eq!(detail, "Invalid regex: missing )");
    }

    #[test]
    fn test_extract_detail_structured() {
        let detail = extract_detail(r#"{"detail": [{"loc": ["body", "text"]}]}"#, Endpoint::Mask);
        assert_eq!(detail, r#"[{"loc":["body","text"]}]"#);
    }

    #[test]
    fn test_extract_detail_fallbacks() {
        assert_eq!(extract_detail("Internal Server Error", Endpoint::Mask), "Masking failed");
        assert_eq!(extract_detail("{}", Endpoint::Unmask), "Unmasking failed");
        assert_eq!(extract_detail(r#"{"detail": ""}"#, Endpoint::TestRegex), "Regex test failed");
        assert_eq!(
            extract_detail(r#"{"detail": null}"#, Endpoint::ValidateConfig),
            "Configuration validation failed"
        );
    }

    #[test]
    fn test_endpoint_error_kinds() {
        assert!(matches!(
            Endpoint::TestRegex.engine_error("x".to_string()),
            CloudMaskError::PatternEngine { .. }
        ));
        assert!(matches!(
            Endpoint::Unmask.engine_error("x".to_string()),
            CloudMaskError::MaskingEngine { .. }
        ));
    }

    #[test]
    fn test_engine_health_deserialization() {
        let health: EngineHealth = serde_json::from_str(r#"{"status": "healthy", "version": "0.1.0"}"#).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "0.1.0");
    }
}
