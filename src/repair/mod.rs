//! 字符串修复工具
//!
//! 解析器和 AI 补全边界共用的纯字符串变换。

pub mod latex;
pub mod markdown;

pub use latex::{fix_hanging_dollar_sign_delimiters, repair};
pub use markdown::normalize;
