//! 业务能力层
//!
//! - `store` - 题目存储接口（`QuestionStore`）
//! - `memory_store` / `toml_store` - 两种存储实现
//! - `enrichment` - AI 补全结果的接收与修复

pub mod enrichment;
pub mod memory_store;
pub mod store;
pub mod toml_store;

pub use enrichment::Enrichment;
pub use memory_store::MemoryStore;
pub use store::QuestionStore;
pub use toml_store::TomlStore;
