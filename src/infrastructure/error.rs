use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 统一的结果类型
pub type Result<T> = std::result::Result<T, CloudMaskError>;

/// CloudMask 错误类型
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CloudMaskError {
    #[error("{message}")]
    Validation { message: String, field: Option<String> },

    #[error("Unsupported file format: {extension} (expected .json, .yml or .yaml)")]
    UnsupportedFormat { extension: String },

    #[error("{message}")]
    PatternEngine { message: String },

    #[error("{message}")]
    MaskingEngine { message: String },

    #[error("{message}")]
    EmptyInput { message: String },

    #[error("Please load a mapping file first")]
    MissingMapping,

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Configuration \"{name}\" not found")]
    NotFound { name: String },

    #[error("A {operation} request is already in progress")]
    OperationInFlight { operation: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("{content_type} parse error: {message}")]
    Parsing { message: String, content_type: String },

    #[error("Network error: {message}")]
    Network { message: String, url: Option<String> },

    #[error("File system error: {message}")]
    FileSystem { message: String, path: Option<String> },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// 调用前的输入检查
    Precondition,
    /// 外部引擎报告的失败
    ExternalService,
    /// 本地持久化、文件与网络
    Infrastructure,
    /// 数据解析
    Data,
    /// 用户主动取消
    Cancellation,
}

impl CloudMaskError {
    /// 用户取消不是失败，调用方应静默处理
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CloudMaskError::UserCancelled)
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            CloudMaskError::Validation { .. }
            | CloudMaskError::UnsupportedFormat { .. }
            | CloudMaskError::EmptyInput { .. }
            | CloudMaskError::MissingMapping
            | CloudMaskError::NotFound { .. }
            | CloudMaskError::OperationInFlight { .. } => ErrorCategory::Precondition,
            CloudMaskError::PatternEngine { .. } | CloudMaskError::MaskingEngine { .. } => {
                ErrorCategory::ExternalService
            }
            CloudMaskError::Storage { .. }
            | CloudMaskError::Network { .. }
            | CloudMaskError::FileSystem { .. }
            | CloudMaskError::Configuration { .. } => ErrorCategory::Infrastructure,
            CloudMaskError::Parsing { .. } => ErrorCategory::Data,
            CloudMaskError::UserCancelled => ErrorCategory::Cancellation,
        }
    }

    /// 面向用户的提示文本；引擎错误原样透传
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// 创建校验错误
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        CloudMaskError::Validation {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    /// 创建空输入错误
    pub fn empty_input(message: impl Into<String>) -> Self {
        CloudMaskError::EmptyInput {
            message: message.into(),
        }
    }

    /// 创建存储错误
    pub fn storage(message: impl Into<String>) -> Self {
        CloudMaskError::Storage {
            message: message.into(),
        }
    }

    /// 创建文件系统错误
    pub fn file_system(message: impl Into<String>, path: Option<String>) -> Self {
        CloudMaskError::FileSystem {
            message: message.into(),
            path,
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        CloudMaskError::Configuration {
            message: message.into(),
        }
    }
}

// 实现从常见错误类型的转换
impl From<std::io::Error> for CloudMaskError {
    fn from(error: std::io::Error) -> Self {
        CloudMaskError::FileSystem {
            message: error.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for CloudMaskError {
    fn from(error: serde_json::Error) -> Self {
        CloudMaskError::Parsing {
            message: error.to_string(),
            content_type: "JSON".to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CloudMaskError {
    fn from(error: serde_yaml::Error) -> Self {
        CloudMaskError::Parsing {
            message: error.to_string(),
            content_type: "YAML".to_string(),
        }
    }
}

impl From<reqwest::Error> for CloudMaskError {
    fn from(error: reqwest::Error) -> Self {
        CloudMaskError::Network {
            message: error.to_string(),
            url: error.url().map(|u| u.to_string()),
        }
    }
}
