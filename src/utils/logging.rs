use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供运行日志文件和统计输出的辅助函数
use std::fs;
use tracing::info;

use crate::orchestrator::ScrapeStats;

/// 初始化日志文件（写入带时间戳的运行头）
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n题库页面解析日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `html_folder`: 页面目录
/// - `store_folder`: 题目存储目录
pub fn log_startup(html_folder: &str, store_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题库页面解析模式");
    info!("📁 页面目录: {}", html_folder);
    info!("💾 存储目录: {}", store_folder);
    info!("{}", "=".repeat(60));
}

/// 记录单个页面开始处理
///
/// # 参数
/// - `page_num`: 页面编号（从 1 开始）
/// - `total`: 页面总数
/// - `file_name`: 页面文件名
pub fn log_page_start(page_num: usize, total: usize, file_name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📄 处理第 {}/{} 页: {}", page_num, total, file_name);
    info!("{}", "─".repeat(60));
}

/// 记录单个页面处理结果
pub fn log_page_complete(page_num: usize, stats: &ScrapeStats) {
    info!(
        "✓ 第 {} 页完成: 解析 {}/{}，新增 {}，更新 {}，未变 {}，失败 {}",
        page_num,
        stats.parsed,
        stats.found,
        stats.created,
        stats.updated,
        stats.unchanged,
        stats.failed
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `total`: 所有页面的累计统计
/// - `failed_pages`: 整页失败的数量
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(total: &ScrapeStats, failed_pages: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 解析成功: {}/{}", total.parsed, total.found);
    info!("🆕 新增: {}  🔄 更新: {}  ⏸ 未变: {}", total.created, total.updated, total.unchanged);
    info!("⏭ 跳过: {}", total.skipped);
    info!("❌ 写入失败: {}  整页失败: {}", total.failed, failed_pages);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
