use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::infrastructure::error::{CloudMaskError, Result};

/// 网络客户端配置
///
/// 引擎调用不做自动重试，失败由调用方显式重新提交。
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("cloudmask/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// 创建 HTTP 客户端
pub fn build_client(config: &NetworkConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| CloudMaskError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            url: None,
        })
}
