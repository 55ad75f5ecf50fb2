//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量页面处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载页面（`Vec<HtmlPage>`）
//! - 输出全局统计信息
//!
//! ### `page_scraper` - 单页处理器
//! - 解析页面上的所有题目块/信息块对
//! - 与存储对比，新增题目或更新列表序号
//! - 输出单页统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<HtmlPage>)
//!     ↓
//! page_scraper (处理一页上的 Vec<ParsedQuestion>)
//!     ↓
//! parsing (解析单个题目块)      services (QuestionStore)
//! ```

pub mod batch_processor;
pub mod page_scraper;

// 重新导出主要类型
pub use batch_processor::{load_pages, App, HtmlPage};
pub use page_scraper::{parse_page, PageRequest, PageScraper, ScrapeStats};
