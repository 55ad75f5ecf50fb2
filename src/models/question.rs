use serde::{Deserialize, Serialize};

use crate::models::solution_type::SolutionType;

/// 一个可选答案
///
/// 单选/多选题中是一个选项；分组匹配题中是一组候选值（用 `|` 连接）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// 选项标号（"1"、"2"… 或分组标题 "А"、"Б"…）
    pub order: String,
    pub body: String,
}

impl QuestionOption {
    pub fn new(order: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            order: order.into(),
            body: body.into(),
        }
    }
}

/// 题目块的解析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQBlock {
    pub id: String,
    pub prompt: String,
    pub body: String,
    /// 提升到题目级别的图片地址
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// 题目在考试中的位置（"Задание №5" 中的 5）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_position: Option<i32>,
}

/// 信息块的解析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIBlock {
    pub name: String,
    pub solution_type: SolutionType,
    /// 分类代码（КЭС）
    #[serde(default)]
    pub topic_ids: Vec<String>,
}

/// 题目块 + 紧随其后的信息块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub qblock: ParsedQBlock,
    pub iblock: ParsedIBlock,
    /// 题目在列表页中的序号，按分类筛选的页面上没有
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_position: Option<i64>,
}

impl ParsedQuestion {
    pub fn id(&self) -> &str {
        &self.qblock.id
    }
}

/// 写入存储的完整题目记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub body: String,
    pub solution_type: SolutionType,
    #[serde(default)]
    pub attachments: Vec<String>,
    /// 已在存储中确认存在的分类代码
    #[serde(default)]
    pub topic_ids: Vec<String>,
    /// 通过允许集合校验的考试位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_position: Option<i64>,
    /// 放在最后，TOML 中输出为 `[[options]]` 表数组
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl std::fmt::Display for ParsedQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断题干以便显示（最多80个字符）
        let body_preview = if self.qblock.body.chars().count() > 80 {
            self.qblock.body.chars().take(80).collect::<String>() + "..."
        } else {
            self.qblock.body.clone()
        };
        write!(
            f,
            "[{} {}] {}",
            self.qblock.id, self.iblock.solution_type, body_preview
        )
    }
}
