use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 info，verbose 时为 debug。
/// 重复调用（例如多个测试）时静默忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
