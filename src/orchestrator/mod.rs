//! 脱敏/还原往返的编排。
//!
//! 一个 `MaskingOrchestrator` 对应一个表单实例：每种操作各自维护
//! `Idle -> Submitting -> {Succeeded | Failed}` 状态，同一时刻最多一个在途请求。
//! 不同表单实例之间除了共享引擎客户端外没有可变状态。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{MaskRequest, MaskingEngine, UnmaskRequest};
use crate::infrastructure::error::{CloudMaskError, Result};
use crate::infrastructure::logging::OperationTracker;
use crate::models::{MappingArtifact, MaskOutcome, MaskingConfiguration, OperationResult, UnmaskOperationResult};

pub mod files;

pub use files::{
    export_mapping, load_mapping, mapping_file_name, masked_output_name, read_input_file,
    unmasked_output_name, InputFile, LARGE_FILE_BYTES, MAX_FILE_BYTES,
};

/// 单个操作的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// 一种操作的在途标记与状态
#[derive(Debug)]
pub(crate) struct OperationSlot {
    operation: &'static str,
    state: Mutex<OperationState>,
}

impl OperationSlot {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            state: Mutex::new(OperationState::Idle),
        }
    }

    pub(crate) fn state(&self) -> OperationState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 进入 Submitting；已有在途请求时拒绝
    pub(crate) fn begin(&self) -> Result<SubmissionGuard<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == OperationState::Submitting {
            return Err(CloudMaskError::OperationInFlight {
                operation: self.operation.to_string(),
            });
        }
        *state = OperationState::Submitting;
        Ok(SubmissionGuard {
            slot: self,
            finished: false,
        })
    }

    fn set(&self, next: OperationState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// 在途请求的守卫；请求被放弃（future 被丢弃）时状态回到 Idle
pub(crate) struct SubmissionGuard<'a> {
    slot: &'a OperationSlot,
    finished: bool,
}

impl SubmissionGuard<'_> {
    pub(crate) fn finish(mut self, state: OperationState) {
        self.slot.set(state);
        self.finished = true;
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.slot.set(OperationState::Idle);
        }
    }
}

/// 脱敏编排器（每个表单实例一个）
pub struct MaskingOrchestrator {
    engine: Arc<dyn MaskingEngine>,
    mask_slot: OperationSlot,
    unmask_slot: OperationSlot,
    disposed: AtomicBool,
}

impl MaskingOrchestrator {
    pub fn new(engine: Arc<dyn MaskingEngine>) -> Self {
        Self {
            engine,
            mask_slot: OperationSlot::new("mask"),
            unmask_slot: OperationSlot::new("unmask"),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn mask_state(&self) -> OperationState {
        self.mask_slot.state()
    }

    pub fn unmask_state(&self) -> OperationState {
        self.unmask_slot.state()
    }

    /// 表单被关闭；之后到达的结果一律丢弃
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// 脱敏文本，返回结果和还原所需的映射
    ///
    /// 映射不会被持久化，由调用方保存（见 [`export_mapping`]）。
    pub async fn mask(&self, text: &str, config: &MaskingConfiguration) -> Result<MaskOutcome> {
        if text.trim().is_empty() {
            return Err(CloudMaskError::empty_input("Please enter some text to mask"));
        }

        let guard = self.mask_slot.begin()?;
        let tracker = OperationTracker::new("mask");
        let request = MaskRequest::new(text, config);

        let response = match self.engine.mask(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracker.fail(&e);
                guard.finish(OperationState::Failed);
                return Err(self.discard_if_disposed(e));
            }
        };

        if self.is_disposed() {
            debug!("Discarding mask result for disposed form");
            guard.finish(OperationState::Idle);
            return Err(CloudMaskError::UserCancelled);
        }

        info!(
            "Masked {} items in {:.1}ms",
            response.items_masked, response.processing_time_ms
        );
        tracker.succeed(response.items_masked);
        guard.finish(OperationState::Succeeded);

        Ok(MaskOutcome {
            result: OperationResult {
                transformed_text: response.masked_text,
                items_affected: response.items_masked,
                processing_time_ms: response.processing_time_ms,
            },
            mapping: response.mapping,
        })
    }

    /// 用脱敏时产生的映射还原文本
    ///
    /// 映射按原样交给引擎；不检查映射是否对应这段文本，
    /// 引擎结果原样返回。
    pub async fn unmask(&self, text: &str, mapping: Option<&MappingArtifact>) -> Result<UnmaskOperationResult> {
        if text.trim().is_empty() {
            return Err(CloudMaskError::empty_input("Please enter some text to unmask"));
        }
        let mapping = mapping.ok_or(CloudMaskError::MissingMapping)?;

        let guard = self.unmask_slot.begin()?;
        let tracker = OperationTracker::new("unmask");
        let request = UnmaskRequest {
            text: text.to_string(),
            mapping: mapping.clone(),
        };

        let response = match self.engine.unmask(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracker.fail(&e);
                guard.finish(OperationState::Failed);
                return Err(self.discard_if_disposed(e));
            }
        };

        if self.is_disposed() {
            debug!("Discarding unmask result for disposed form");
            guard.finish(OperationState::Idle);
            return Err(CloudMaskError::UserCancelled);
        }

        info!(
            "Unmasked {} items in {:.1}ms",
            response.items_unmasked, response.processing_time_ms
        );
        tracker.succeed(response.items_unmasked);
        guard.finish(OperationState::Succeeded);

        Ok(OperationResult {
            transformed_text: response.unmasked_text,
            items_affected: response.items_unmasked,
            processing_time_ms: response.processing_time_ms,
        })
    }

    fn discard_if_disposed(&self, error: CloudMaskError) -> CloudMaskError {
        if self.is_disposed() {
            CloudMaskError::UserCancelled
        } else {
            error
        }
    }
}
