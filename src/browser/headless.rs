use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};
use crate::infrastructure::{PageSession, SessionLauncher};

/// 元素轮询间隔
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(200);

const BROWSER_ARGS: [&str; 5] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage", // 防止共享内存不足
    "--disable-gpu",
    "--window-size=1920,1080",
];

/// 无头浏览器启动器
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    executable: Option<PathBuf>,
    headless: bool,
}

impl ChromeLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            executable: config.chrome_executable.as_ref().map(PathBuf::from),
            headless: config.headless,
        }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self) -> AppResult<Box<dyn PageSession>> {
        let session = launch_headless_browser(self.executable.clone(), self.headless).await?;
        Ok(Box::new(session))
    }
}

/// 启动无头浏览器并打开一个空白页
pub async fn launch_headless_browser(
    executable: Option<PathBuf>,
    headless: bool,
) -> AppResult<ChromeSession> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder().args(BROWSER_ARGS.to_vec());
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable {
        debug!("浏览器路径: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        AppError::launch_failed(std::io::Error::other(e))
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::launch_failed(e)
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(e),
        })
    })?;

    info!("✅ 无头浏览器已就绪");

    Ok(ChromeSession {
        browser,
        page,
        handler_task: Some(handler_task),
    })
}

/// 反复检查直到返回 true；整个过程（含单次检查）不超过 `limit`
async fn poll_until<F, Fut>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    timeout(limit, async {
        while !check().await {
            sleep(SELECTOR_POLL_INTERVAL).await;
        }
    })
    .await
    .is_ok()
}

/// chromiumoxide 实现的渲染页面会话
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str, limit: Duration) -> AppResult<()> {
        debug!("导航到: {}", url);
        let page = &self.page;
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match timeout(limit, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(AppError::navigation_failed(url, e)),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: limit.as_secs(),
            }
            .into()),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, limit: Duration) -> AppResult<()> {
        let page = &self.page;
        let found = poll_until(limit, || async move {
            page.find_element(selector).await.is_ok()
        })
        .await;

        if found {
            Ok(())
        } else {
            Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_secs: limit.as_secs(),
            }
            .into())
        }
    }

    async fn content(&mut self) -> AppResult<String> {
        self.page.content().await.map_err(|e| {
            BrowserError::ContentFailed {
                source: Box::new(e),
            }
            .into()
        })
    }

    async fn close(&mut self) -> AppResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        if let Some(task) = self.handler_task.take() {
            let _ = task.await;
        }
        info!("🧹 浏览器已关闭");
        Ok(())
    }
}
