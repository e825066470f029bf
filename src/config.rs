use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ConfigError};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "scraper.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务端口
    pub server_port: u16,
    /// 题库站点根地址
    pub base_url: String,
    /// 列表页 exam_type 查询参数
    pub listing_exam_type: String,
    /// 详情页导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 等待正确答案元素的超时（秒）
    pub answer_wait_timeout_secs: u64,
    /// 列表页 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    /// JSON Lines 输出文件
    pub output_file: String,
    /// 浏览器可执行文件路径（为空时自动查找）
    pub chrome_executable: Option<String>,
    /// 是否使用无头模式
    pub headless: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            base_url: "https://myschool.ng".to_string(),
            listing_exam_type: "waec".to_string(),
            navigation_timeout_secs: 15,
            answer_wait_timeout_secs: 8,
            http_timeout_secs: 30,
            output_file: "questions.jsonl".to_string(),
            chrome_executable: None,
            headless: true,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 在默认值基础上应用环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::ParseFailed { source, .. }) => {
                AppError::Config(ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    /// 解析 TOML 字符串
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// 按顺序加载：配置文件（SCRAPER_CONFIG 或 scraper.toml）→ 环境变量 → 校验
    pub fn load() -> AppResult<Self> {
        let file = std::env::var("SCRAPER_CONFIG").ok().or_else(|| {
            Path::new(DEFAULT_CONFIG_FILE)
                .exists()
                .then(|| DEFAULT_CONFIG_FILE.to_string())
        });

        let base = match file {
            Some(path) => {
                info!("📁 加载配置文件: {}", path);
                Self::from_file(&path)?
            }
            None => {
                debug!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        let default = self;
        Self {
            server_port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.server_port),
            base_url: std::env::var("BASE_URL").unwrap_or(default.base_url),
            listing_exam_type: std::env::var("LISTING_EXAM_TYPE").unwrap_or(default.listing_exam_type),
            navigation_timeout_secs: std::env::var("NAVIGATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.navigation_timeout_secs),
            answer_wait_timeout_secs: std::env::var("ANSWER_WAIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.answer_wait_timeout_secs),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.http_timeout_secs),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(default.chrome_executable),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url".to_string(),
            reason: e.to_string(),
        })?;

        for (key, value) in [
            ("navigation_timeout_secs", self.navigation_timeout_secs),
            ("answer_wait_timeout_secs", self.answer_wait_timeout_secs),
            ("http_timeout_secs", self.http_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "超时必须大于 0".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn answer_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.answer_wait_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
