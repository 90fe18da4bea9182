use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// 显式的 EnvFilter 指令，设置后取代 `cloudmask=<level>` 默认指令
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            filter: None,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 日志输出目标
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutput {
    /// 标准错误；标准输出留给命令结果
    Stderr,
    /// 追加写入文件
    File(PathBuf),
}

impl LoggingConfig {
    /// 从级别与格式字符串构建配置
    pub fn from_settings(level: &str, format: &str) -> anyhow::Result<Self> {
        let level = Level::from_str(level)
            .map_err(|_| anyhow::anyhow!("Unknown log level: {}", level))?;
        let format = LogFormat::from_str(format).map_err(anyhow::Error::msg)?;

        Ok(Self {
            level,
            format,
            ..Default::default()
        })
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }
}

/// 设置日志系统
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = if let Some(filter) = &config.filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::from_default_env()
            .add_directive(format!("cloudmask={}", config.level).parse()?)
    };

    match &config.output {
        LogOutput::Stderr => {
            let fmt_layer = create_fmt_layer(&config, io::stderr);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogOutput::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let fmt_layer = create_fmt_layer(&config, Mutex::new(file));
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

fn create_fmt_layer<S, W>(config: &LoggingConfig, make_writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(make_writer)
        .with_target(true)
        .with_level(true);

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// 单次操作跟踪（mask / unmask / test-regex）
pub struct OperationTracker {
    operation: String,
    operation_id: String,
    start_time: Instant,
}

impl OperationTracker {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        let operation_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(operation = %operation, operation_id = %operation_id, "Operation started");

        Self {
            operation,
            operation_id,
            start_time: Instant::now(),
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// 操作耗时（毫秒）
    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub fn succeed(self, items: usize) {
        tracing::info!(
            operation = %self.operation,
            operation_id = %self.operation_id,
            duration_ms = self.start_time.elapsed().as_millis() as u64,
            items,
            "Operation completed"
        );
    }

    pub fn fail(self, error: &dyn std::error::Error) {
        tracing::warn!(
            operation = %self.operation,
            operation_id = %self.operation_id,
            duration_ms = self.start_time.elapsed().as_millis() as u64,
            error = %error,
            "Operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(config.filter.is_none());
    }

    #[test]
    fn test_logging_config_from_settings() {
        let config = LoggingConfig::from_settings("debug", "json").unwrap();
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);

        assert!(LoggingConfig::from_settings("loud", "json").is_err());
        assert!(LoggingConfig::from_settings("info", "xml").is_err());
    }

    #[test]
    fn test_operation_tracker_creation() {
        let tracker = OperationTracker::new("mask");
        assert!(!tracker.operation_id().is_empty());
        assert!(tracker.elapsed_ms() >= 0.0);
        tracker.succeed(0);
    }

    #[test]
    fn test_logging_config_builders() {
        let config = LoggingConfig::from_settings("warn", "compact")
            .unwrap()
            .with_filter(Some("cloudmask::engine=trace".to_string()))
            .with_output(LogOutput::File(PathBuf::from("/tmp/cloudmask.log")));

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.filter.as_deref(), Some("cloudmask::engine=trace"));
        assert_eq!(config.output, LogOutput::File(PathBuf::from("/tmp/cloudmask.log")));
    }
}
