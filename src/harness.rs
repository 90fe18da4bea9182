//! 正则测试工具：校验参数后把匹配交给外部引擎。

use std::sync::Arc;

use tracing::info;

use crate::engine::{MaskingEngine, RegexTestRequest};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::infrastructure::logging::OperationTracker;
use crate::models::PatternTestResult;
use crate::orchestrator::{OperationSlot, OperationState};

pub struct PatternTestHarness {
    engine: Arc<dyn MaskingEngine>,
    slot: OperationSlot,
}

impl PatternTestHarness {
    pub fn new(engine: Arc<dyn MaskingEngine>) -> Self {
        Self {
            engine,
            slot: OperationSlot::new("test-regex"),
        }
    }

    pub fn state(&self) -> OperationState {
        self.slot.state()
    }

    /// 用 `pattern` 匹配 `text`
    ///
    /// 任一参数为空时不发起远程调用；引擎报错原样返回为 `PatternEngine`，
    /// 不在本地重新校验正则。零匹配是成功结果。同一时刻只允许一个在途测试。
    pub async fn test(&self, pattern: &str, text: &str) -> Result<PatternTestResult> {
        if pattern.trim().is_empty() || text.trim().is_empty() {
            return Err(CloudMaskError::validation(
                "Both regex pattern and test text are required",
                Some(if pattern.trim().is_empty() { "pattern" } else { "text" }),
            ));
        }

        let guard = self.slot.begin()?;
        let tracker = OperationTracker::new("test-regex");
        let request = RegexTestRequest {
            pattern: pattern.to_string(),
            text: text.to_string(),
        };

        match self.engine.test_regex(&request).await {
            Ok(result) => {
                info!("Pattern matched {} time(s)", result.match_count());
                tracker.succeed(result.match_count());
                guard.finish(OperationState::Succeeded);
                Ok(result)
            }
            Err(e) => {
                tracker.fail(&e);
                guard.finish(OperationState::Failed);
                Err(e)
            }
        }
    }
}
