//! 把每个操作的结果转换为一条用户可见的通知。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infrastructure::error::{CloudMaskError, Result};
use crate::models::{OperationResult, PatternTestResult};

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// 用户可见的通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    /// 错误转通知；用户取消不产生通知
    pub fn from_error(error: &CloudMaskError) -> Option<Self> {
        if error.is_cancellation() {
            None
        } else {
            Some(Self::error(error.user_message()))
        }
    }

    pub fn masked(result: &OperationResult) -> Self {
        Self::success(format!(
            "Masked {} items in {:.1}ms",
            result.items_affected, result.processing_time_ms
        ))
    }

    pub fn unmasked(result: &OperationResult) -> Self {
        Self::success(format!(
            "Unmasked {} items in {:.1}ms",
            result.items_affected, result.processing_time_ms
        ))
    }

    pub fn matches_found(result: &PatternTestResult) -> Self {
        Self::success(format!("Found {} match(es)", result.match_count()))
    }

    pub fn config_saved(name: &str) -> Self {
        Self::success(format!("Configuration \"{}\" saved", name))
    }

    /// 导入后保存，与直接保存区分开
    pub fn config_imported(name: &str) -> Self {
        Self::success(format!("Configuration \"{}\" imported and saved", name))
    }

    pub fn config_loaded(name: &str) -> Self {
        Self::success(format!("Loaded configuration \"{}\"", name))
    }

    pub fn config_deleted(name: &str) -> Self {
        Self::success(format!("Deleted configuration \"{}\"", name))
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

/// 操作边界：结果恰好转换成一条通知，取消时为 `None`
pub fn notify<T>(result: &Result<T>, on_success: impl FnOnce(&T) -> Notification) -> Option<Notification> {
    match result {
        Ok(value) => Some(on_success(value)),
        Err(error) => Notification::from_error(error),
    }
}
