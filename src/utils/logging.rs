//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::RunSummary;

/// 初始化 tracing 日志
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 初始化日志文件（写入头部）
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n视频发布日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(pacing_secs: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 视频批量发布模式");
    info!("⏳ 发布间隔: {} 秒", pacing_secs);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批量发布完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded, summary.total);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
