use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 列表页抓取错误
    #[error("抓取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 任务被外部取消
    #[error("任务已取消")]
    Cancelled,
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed { source: BoxError },
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed { source: BoxError },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed { url: String, source: BoxError },
    /// 导航超时
    #[error("导航到 {url} 超时 ({timeout_secs}s)")]
    NavigationTimeout { url: String, timeout_secs: u64 },
    /// 等待元素超时
    #[error("等待元素 {selector} 超时 ({timeout_secs}s)")]
    SelectorTimeout { selector: String, timeout_secs: u64 },
    /// 读取页面内容失败
    #[error("读取页面内容失败: {source}")]
    ContentFailed { source: BoxError },
    /// 页面缺少预期元素
    #[error("页面缺少元素: {selector}")]
    ElementMissing { selector: String },
}

/// 列表页抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络请求失败
    #[error("请求 {url} 失败: {source}")]
    RequestFailed { url: String, source: BoxError },
    /// 返回非 2xx 状态码
    #[error("请求 {url} 返回状态码 {status}")]
    BadStatus { url: String, status: u16 },
    /// 读取响应体失败
    #[error("读取 {url} 响应体失败: {source}")]
    BodyFailed { url: String, source: BoxError },
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 记录未通过校验
    #[error("记录校验失败: {reason}")]
    Validation { reason: String },
    /// 写入失败
    #[error("写入 {path} 失败: {source}")]
    WriteFailed { path: String, source: BoxError },
    /// 序列化失败
    #[error("序列化失败: {source}")]
    SerializeFailed { source: BoxError },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件 {path} 失败: {source}")]
    ReadFailed { path: String, source: BoxError },
    /// 解析配置文件失败
    #[error("解析配置文件 {path} 失败: {source}")]
    ParseFailed { path: String, source: BoxError },
    /// 配置项取值非法
    #[error("配置项 {key} 非法: {reason}")]
    InvalidValue { key: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ContentFailed {
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Fetch(FetchError::RequestFailed {
            url,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::SerializeFailed {
            source: Box::new(err),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::ParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器启动错误
    pub fn launch_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::LaunchFailed {
            source: Box::new(source),
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储写入错误
    pub fn write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否为会话启动失败（整个任务无法开始）
    pub fn is_launch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Browser(BrowserError::LaunchFailed { .. })
                | AppError::Browser(BrowserError::PageCreationFailed { .. })
        )
    }
}

// ========== 进度事件文本 ==========

impl AppError {
    /// 推送给观察端的英文描述
    ///
    /// Display 面向日志（中文），进度事件统一使用英文。
    pub fn summary(&self) -> String {
        match self {
            AppError::Browser(e) => e.summary(),
            AppError::Fetch(e) => e.summary(),
            AppError::Storage(e) => e.summary(),
            AppError::Config(e) => e.summary(),
            AppError::Cancelled => "cancelled".to_string(),
            AppError::Other(message) => message.clone(),
        }
    }
}

impl BrowserError {
    pub fn summary(&self) -> String {
        match self {
            BrowserError::LaunchFailed { source } => format!("browser launch failed: {}", source),
            BrowserError::PageCreationFailed { source } => {
                format!("page creation failed: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                format!("navigation to {} failed: {}", url, source)
            }
            BrowserError::NavigationTimeout { url, timeout_secs } => {
                format!("navigation to {} timed out after {}s", url, timeout_secs)
            }
            BrowserError::SelectorTimeout {
                selector,
                timeout_secs,
            } => format!("waiting for {} timed out after {}s", selector, timeout_secs),
            BrowserError::ContentFailed { source } => {
                format!("reading page content failed: {}", source)
            }
            BrowserError::ElementMissing { selector } => format!("element {} not found", selector),
        }
    }
}

impl FetchError {
    pub fn summary(&self) -> String {
        match self {
            FetchError::RequestFailed { url, source } => {
                format!("request to {} failed: {}", url, source)
            }
            FetchError::BadStatus { url, status } => format!("HTTP {} from {}", status, url),
            FetchError::BodyFailed { url, source } => {
                format!("reading response from {} failed: {}", url, source)
            }
        }
    }
}

impl StorageError {
    pub fn summary(&self) -> String {
        match self {
            StorageError::Validation { reason } => format!("invalid record: {}", reason),
            StorageError::WriteFailed { path, source } => {
                format!("writing {} failed: {}", path, source)
            }
            StorageError::SerializeFailed { source } => {
                format!("serialization failed: {}", source)
            }
        }
    }
}

impl ConfigError {
    pub fn summary(&self) -> String {
        match self {
            ConfigError::ReadFailed { path, source } => {
                format!("reading config {} failed: {}", path, source)
            }
            ConfigError::ParseFailed { path, source } => {
                format!("parsing config {} failed: {}", path, source)
            }
            ConfigError::InvalidValue { key, reason } => {
                format!("invalid config value {}: {}", key, reason)
            }
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
