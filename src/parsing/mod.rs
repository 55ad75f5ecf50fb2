//! 页面解析层
//!
//! ## 模块划分
//!
//! - `node` - html5ever 解析结果转换成的只读节点树
//! - `context` - 单个题目块的解析上下文与遍历选项
//! - `attachments` - 脚本中的图片触发调用与地址解析
//! - `renderer` - 递归渲染：正文 / 表格 / 图片 / 公式
//! - `extractor` - 题目块与信息块的字段抽取
//!
//! ## 层次关系
//!
//! ```text
//! extractor (ParsedQBlock / ParsedIBlock)
//!     ↓
//! renderer (Markdown 文本 + 图片旁路)
//!     ↓
//! math (MathML → LaTeX) / attachments
//!     ↓
//! node (RawNode)
//! ```

pub mod attachments;
pub mod context;
pub mod extractor;
pub mod node;
pub mod renderer;

pub use context::{ParsingContext, TraversalOptions};
pub use extractor::{find_block_pairs, parse_iblock, parse_label, parse_qblock};
pub use node::RawNode;
pub use renderer::{render, render_all};
