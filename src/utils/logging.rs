/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::orchestrator::SheetStats;

/// 初始化 tracing 日志
///
/// 日志级别读取 `RUST_LOG`，未设置时为 `info`（详细模式为 `debug`）；重复调用不会报错
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n评分日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize, use_oracle: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量评分模式");
    info!("📊 最大并发数: {}", max_concurrent);
    info!(
        "🤖 语义判定器: {}",
        if use_oracle { "启用" } else { "未启用" }
    );
    info!("{}", "=".repeat(60));
}

/// 记录答题卡加载信息
pub fn log_sheets_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 张待评分的答题卡", total);
    info!("📋 最多同时评分 {} 张\n", max_concurrent);
}

/// 记录单张答题卡完成信息
pub fn log_batch_complete(sheet_index: usize, name: &str, stats: &SheetStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 张答题卡完成 ({}): 通过 {}/{}",
        sheet_index,
        name,
        stats.pass,
        stats.total()
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &SheetStats, log_file_path: &str, review_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部评分完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ PASS: {}/{}", stats.pass, stats.total());
    info!("❌ FAIL: {}", stats.fail);
    info!("🔎 REVIEW: {}", stats.review);
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
    if stats.review + stats.skipped > 0 {
        info!("复核清单: {}", review_file_path);
    }
}

/// 截断长文本用于日志显示
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
