use phf::phf_map;
use tracing::warn;

/// 答题方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SolutionType {
    /// 简答（填写一个数或词）
    Short,
    /// 详细解答
    Long,
    /// 单选
    MultiChoice,
    /// 多选
    MultiResponse,
    /// 分组匹配（每组一个下拉框）
    MultiChoiceGroup,
}

/// 题库页面上的标签 → 答题方式
///
/// 新增一种标签只需要在这里加一行。
static SOLUTION_TYPE_LABELS: phf::Map<&'static str, SolutionType> = phf_map! {
    "Краткий ответ" => SolutionType::Short,
    "Развернутый ответ" => SolutionType::Long,
    "Выбор ответа из предложенных вариантов" => SolutionType::MultiChoice,
    "Множественный выбор" => SolutionType::MultiResponse,
    "Установление соответствия" => SolutionType::MultiChoiceGroup,
};

impl SolutionType {
    /// 精确匹配标签
    pub fn from_label(label: &str) -> Option<Self> {
        SOLUTION_TYPE_LABELS.get(label.trim()).copied()
    }

    /// 匹配标签，未知标签记录警告并按详细解答处理
    pub fn classify(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| {
            warn!("未知的答题方式标签: '{}'，按详细解答处理", label.trim());
            SolutionType::Long
        })
    }

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            SolutionType::Short => "SHORT",
            SolutionType::Long => "LONG",
            SolutionType::MultiChoice => "MULTICHOICE",
            SolutionType::MultiResponse => "MULTIRESPONSE",
            SolutionType::MultiChoiceGroup => "MULTICHOICEGROUP",
        }
    }
}

impl std::fmt::Display for SolutionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
