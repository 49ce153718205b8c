//! 网关配置
//!
//! 以 JSON 保存在 `~/.miraichat/config.json`，文件不存在时使用默认值。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MiraiChatError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// mirai-api-http 地址
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 已认证的 session，会话生命周期由外部管理
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    pub const ENV_BASE_URL: &'static str = "MIRAICHAT_BASE_URL";
    pub const ENV_SESSION_KEY: &'static str = "MIRAICHAT_SESSION_KEY";

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| MiraiChatError::Config(format!("读取配置失败: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MiraiChatError::Config(format!("解析配置失败: {}", e)))?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MiraiChatError::Config(format!("创建目录失败: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MiraiChatError::Config(format!("序列化配置失败: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| MiraiChatError::Config(format!("写入配置失败: {}", e)))?;

        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".miraichat")
            .join("config.json")
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(Self::ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(session_key) = lookup(Self::ENV_SESSION_KEY) {
            self.session_key = Some(session_key);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn endpoint(&self, command: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), command)
    }
}
