//! MathML → LaTeX 转换器
//!
//! 结构转换交给 [`mathml`]，结果一律经过 LaTeX 修复流水线。
//! 转换失败直接返回错误，公式不做"尽力而为"的降级。

pub mod mathml;
pub mod symbols;

use crate::error::MathError;
use crate::repair;

/// 转换 MathML 片段并修复输出
pub fn to_latex(fragment: &str) -> Result<String, MathError> {
    let raw = mathml::mathml_to_latex(fragment)?;
    Ok(repair::repair(&raw))
}
