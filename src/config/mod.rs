use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::logging::{LogFormat, LogOutput, LoggingConfig};
use crate::infrastructure::network::NetworkConfig;

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub engine_url: String,
    pub data_dir: PathBuf,
    pub timeout_secs: u64,
    pub log_level: String,
    pub log_format: String,
    /// 显式 EnvFilter 指令（`CLOUDMASK_LOG_FILTER`）
    pub log_filter: Option<String>,
    /// 日志文件；未设置时写标准错误
    pub log_file: Option<PathBuf>,
    // 日志系统尚未初始化，留到 validate() 报告
    invalid_timeout: Option<String>,
}

impl Settings {
    pub fn new() -> Self {
        // 默认配置
        let mut settings = Settings {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            data_dir: default_data_dir(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            log_filter: None,
            log_file: None,
            invalid_timeout: None,
        };

        // 加载配置文件
        #[cfg(not(test))]
        settings.load_from_env_file();
        // 加载环境变量（覆盖配置文件）
        settings.load_from_env();

        settings
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(home).join(".cloudmask").join(".env");
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(url) = env::var("CLOUDMASK_ENGINE_URL") {
            self.engine_url = url;
        }
        if let Ok(dir) = env::var("CLOUDMASK_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(timeout) = env::var("CLOUDMASK_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => {
                    self.timeout_secs = secs;
                    self.invalid_timeout = None;
                }
                Err(_) => self.invalid_timeout = Some(timeout),
            }
        }
        if let Ok(level) = env::var("CLOUDMASK_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = env::var("CLOUDMASK_LOG_FORMAT") {
            self.log_format = format;
        }
        if let Ok(filter) = env::var("CLOUDMASK_LOG_FILTER") {
            if !filter.trim().is_empty() {
                self.log_filter = Some(filter);
            }
        }
        if let Ok(file) = env::var("CLOUDMASK_LOG_FILE") {
            if !file.trim().is_empty() {
                self.log_file = Some(PathBuf::from(file));
            }
        }
    }

    pub fn update_from_args(&mut self, cli: &crate::cli::args::Cli) {
        // 命令行参数优先级最高
        if let Some(url) = &cli.engine_url {
            self.engine_url = url.clone();
        }
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
            self.invalid_timeout = None;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            self.log_format = format.clone();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.engine_url)
            .map_err(|e| anyhow::anyhow!("Invalid engine URL {}: {}", self.engine_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Engine URL must use http or https: {}", self.engine_url);
        }
        if let Some(raw) = &self.invalid_timeout {
            anyhow::bail!("Invalid CLOUDMASK_TIMEOUT_SECS: {}", raw);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("Request timeout must be greater than zero");
        }
        LogFormat::from_str(&self.log_format).map_err(anyhow::Error::msg)?;
        Ok(())
    }

    pub fn logging_config(&self) -> anyhow::Result<LoggingConfig> {
        let output = match &self.log_file {
            Some(path) => LogOutput::File(path.clone()),
            None => LogOutput::Stderr,
        };
        Ok(LoggingConfig::from_settings(&self.log_level, &self.log_format)?
            .with_filter(self.log_filter.clone())
            .with_output(output))
    }

    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::default().with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

fn default_data_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".cloudmask")
}
