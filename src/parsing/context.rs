//! 解析上下文与遍历选项

/// 单次题目块解析的累加器
///
/// 每个题目块新建一个，由一次顶层解析独占（`&mut`），解析结束后丢弃。
/// 递归过程中被提升到题目级别的图片都记录在这里。
#[derive(Debug, Clone, Default)]
pub struct ParsingContext {
    /// 提升到题目级别的图片地址（按文档顺序）
    pub top_level_attachments: Vec<String>,
    /// 已生成的行内图片数量，用于图片编号
    pub inline_attachment_count: usize,
    /// 年级，决定图片地址使用哪个题库的基础地址
    pub grade: Option<String>,
}

impl ParsingContext {
    pub fn new(grade: Option<String>) -> Self {
        Self {
            grade,
            ..Default::default()
        }
    }

    /// 生成下一个行内图片编号（从 1 开始）
    pub fn next_inline_number(&mut self) -> usize {
        self.inline_attachment_count += 1;
        self.inline_attachment_count
    }
}

/// 沿递归向下传递的选项
///
/// 只作用于当前子树，不会影响兄弟节点，也不保存在 [`ParsingContext`] 中。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalOptions {
    /// 处于 `<math>` 内部：标签原样输出，交给公式转换器
    pub is_math: bool,
    /// 强制把表格当作排版用的容器展开
    pub is_non_semantic_table: bool,
    /// 图片输出为行内 Markdown；否则提升到题目级别
    pub inline_attachments: bool,
}

impl TraversalOptions {
    pub fn math(self) -> Self {
        Self {
            is_math: true,
            ..self
        }
    }

    pub fn with_inline_attachments(self, inline_attachments: bool) -> Self {
        Self {
            inline_attachments,
            ..self
        }
    }

    pub fn with_non_semantic_table(self, is_non_semantic_table: bool) -> Self {
        Self {
            is_non_semantic_table,
            ..self
        }
    }
}
