//! AI 补全结果的边界处理
//!
//! 补全服务本身不在本 crate 内，这里只接收它返回的 JSON
//! `{work, hint, solution}`，并在入库前修复其中的公式和 Markdown。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::repair;

/// 补全返回的三段文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub work: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub solution: String,
}

impl Enrichment {
    /// 从补全服务返回的 JSON 解析
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("补全结果不是合法的 JSON")
    }

    /// 合并跨行公式，再做 Markdown 预处理
    pub fn repaired(&self) -> Self {
        Self {
            work: repair_field(&self.work),
            hint: repair_field(&self.hint),
            solution: repair_field(&self.solution),
        }
    }
}

fn repair_field(text: &str) -> String {
    let text = repair::fix_hanging_dollar_sign_delimiters(text);
    repair::normalize(&text)
}
