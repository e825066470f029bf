/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::workflow::CategoryReport;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库抓取服务");
    info!("🌐 站点: {}", config.base_url);
    info!("💾 输出文件: {}", config.output_file);
    info!("🔌 监听端口: {}", config.server_port);
    info!("{}", "=".repeat(60));
}

/// 记录单次抓取开始
pub fn log_run_start(subject_name: &str, subject_slug: &str, session_id: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📚 开始抓取科目: {} ({})", subject_name, subject_slug);
    info!("🆔 会话: {}", session_id);
    info!("{}", "=".repeat(60));
}

/// 打印单次抓取的统计信息
pub fn print_run_summary(subject_name: &str, reports: &[CategoryReport], total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📊 {} 抓取完成统计", subject_name);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for report in reports {
        info!(
            "  {:<10} 保存 {:>4} 道 | {:>3} 页 | {:?}",
            report.category.as_str(),
            report.saved,
            report.pages_processed,
            report.stop
        );
    }
    info!("✅ 合计: {}", total);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("题目题目题目", 2), "题目...");
    }
}
