//! # FIPI Question Parser
//!
//! 把题库列表页的 HTML 解析成结构化题目记录的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统自底向上分为四层：
//!
//! ### ① 字符串修复（Repair）
//! - `repair/latex` - LaTeX 修复流水线（分数、单侧括号、绝对值、cases、空上下标）
//! - `repair/markdown` - Markdown 预处理（有序列表转义、换行提升）
//!
//! ### ② 公式与解析（Math / Parsing）
//! - `math/` - MathML → LaTeX 转换
//! - `parsing/` - 节点树渲染，题目块/信息块抽取
//!
//! ### ③ 业务能力层（Services）
//! - `QuestionStore` - 题目存储接口，`MemoryStore` / `TomlStore` 两种实现
//! - `Enrichment` - AI 补全结果的接收与修复
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量页面处理器
//! - `orchestrator/page_scraper` - 单页处理器，查重并并发写入
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;
pub mod math;
pub mod models;
pub mod orchestrator;
pub mod parsing;
pub mod repair;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, MathError, ParseError, StoreError};
pub use models::{ParsedIBlock, ParsedQBlock, ParsedQuestion, QuestionOption, QuestionRecord, SolutionType};
pub use orchestrator::{App, PageRequest, PageScraper, ScrapeStats};
pub use services::{Enrichment, MemoryStore, QuestionStore, TomlStore};
