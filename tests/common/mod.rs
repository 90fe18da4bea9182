#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Notify;

use cloudmask::engine::{MaskRequest, MaskResponse, MaskingEngine, RegexTestRequest, UnmaskRequest, UnmaskResponse};
use cloudmask::models::{MappingArtifact, MaskingConfiguration, PatternTestResult};
use cloudmask::{CloudMaskError, Result};

/// 本地假引擎：把配置中的公司名替换成 `company-N`，并按映射还原
#[derive(Default)]
pub struct FakeEngine {
    pub mask_calls: AtomicUsize,
    pub unmask_calls: AtomicUsize,
    pub regex_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    /// 设置后 mask 和 test_regex 会等待放行
    pub gate: Option<Arc<Notify>>,
    pub last_mask_request: Mutex<Option<MaskRequest>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.mask_calls.load(Ordering::SeqCst)
            + self.unmask_calls.load(Ordering::SeqCst)
            + self.regex_calls.load(Ordering::SeqCst)
            + self.validate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MaskingEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn mask(&self, request: &MaskRequest) -> Result<MaskResponse> {
        self.mask_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_mask_request.lock().unwrap() = Some(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut text = request.text.clone();
        let mut mapping = Map::new();
        let mut items = 0;
        for (i, company) in request.config.company_names.iter().enumerate() {
            let occurrences = text.matches(company.as_str()).count();
            if occurrences == 0 {
                continue;
            }
            let token = format!("company-{}", i + 1);
            text = text.replace(company.as_str(), &token);
            mapping.insert(company.clone(), Value::String(token));
            items += occurrences;
        }

        Ok(MaskResponse {
            masked_text: text,
            items_masked: items,
            processing_time_ms: 1.5,
            mapping: MappingArtifact::new(mapping),
        })
    }

    async fn unmask(&self, request: &UnmaskRequest) -> Result<UnmaskResponse> {
        self.unmask_calls.fetch_add(1, Ordering::SeqCst);

        let mut text = request.text.clone();
        let mut items = 0;
        for (original, token) in request.mapping.as_map() {
            if let Some(token) = token.as_str() {
                items += text.matches(token).count();
                text = text.replace(token, original);
            }
        }

        Ok(UnmaskResponse {
            unmasked_text: text,
            items_unmasked: items,
            processing_time_ms: 0.5,
        })
    }

    async fn test_regex(&self, request: &RegexTestRequest) -> Result<PatternTestResult> {
        self.regex_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let re = regex::Regex::new(&request.pattern).map_err(|e| CloudMaskError::PatternEngine {
            message: format!("Invalid regex: {}", e),
        })?;
        Ok(PatternTestResult {
            matches: re.find_iter(&request.text).map(|m| m.as_str().to_string()).collect(),
        })
    }

    async fn validate_config(&self, config: &MaskingConfiguration) -> Result<()> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        for pattern in &config.custom_patterns {
            if regex::Regex::new(&pattern.pattern).is_err() {
                return Err(CloudMaskError::MaskingEngine {
                    message: format!("Invalid pattern '{}'", pattern.name),
                });
            }
        }
        Ok(())
    }
}

pub fn acme_config() -> MaskingConfiguration {
    MaskingConfiguration {
        seed: "test-seed".to_string(),
        company_names: vec!["Acme Corp".to_string(), "Globex".to_string()],
        ..Default::default()
    }
}
