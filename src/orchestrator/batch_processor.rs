//! 批量页面处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量页面的加载和统计。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建题目存储和单页处理器
//! 2. **批量加载**：扫描页面目录下所有 `*.html` 文件（按文件名排序）
//! 3. **逐页处理**：委托 `PageScraper`，第 N 个文件即第 N 页
//! 4. **全局统计**：汇总所有页面的处理结果

use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::page_scraper::{PageRequest, PageScraper, ScrapeStats};
use crate::services::TomlStore;
use crate::utils::logging::{
    init_log_file, log_page_complete, log_page_start, log_startup, print_final_stats,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, warn};

/// 已加载的页面
#[derive(Debug, Clone)]
pub struct HtmlPage {
    pub path: PathBuf,
    pub html: String,
}

impl HtmlPage {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    scraper: PageScraper,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.html_folder, &config.store_folder);

        let store = Arc::new(TomlStore::new(&config.store_folder));
        let scraper = PageScraper::new(store, config.max_exam_position);

        Ok(Self { config, scraper })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ScrapeStats> {
        let pages = load_pages(&self.config.html_folder).await?;

        if pages.is_empty() {
            warn!("⚠️ 没有找到待处理的 HTML 文件，程序结束");
            return Ok(ScrapeStats::default());
        }

        info!("✓ 找到 {} 个待处理的页面\n", pages.len());

        let mut total = ScrapeStats::default();
        let mut failed_pages = 0;

        for (page_index, page) in pages.iter().enumerate() {
            let page_num = page_index + 1;
            log_page_start(page_num, pages.len(), &page.file_name());

            let request = self.page_request(page_index);
            match self.scraper.scrape(&page.html, &request).await {
                Ok(stats) => {
                    log_page_complete(page_num, &stats);
                    total.merge(&stats);
                }
                Err(e) => {
                    error!("[页面 {}] ❌ 处理失败: {:#}", page_num, e);
                    failed_pages += 1;
                }
            }
        }

        print_final_stats(&total, failed_pages, &self.config.output_log_file);

        Ok(total)
    }

    fn page_request(&self, page_index: usize) -> PageRequest {
        PageRequest {
            page_index,
            page_size: self.config.page_size,
            topic_filter: self.config.topic_filter.clone(),
            grade: self.config.grade.clone(),
        }
    }
}

/// 加载目录下的所有 HTML 页面，按文件名排序
pub async fn load_pages(folder_path: &str) -> Result<Vec<HtmlPage>> {
    let folder = Path::new(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    info!("\n📁 正在扫描待处理的页面...");

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("html") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path).await {
            Ok(html) => pages.push(HtmlPage { path, html }),
            Err(e) => warn!("加载失败: {}", AppError::file_read_failed(path.display().to_string(), e)),
        }
    }

    Ok(pages)
}
