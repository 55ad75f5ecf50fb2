//! Markdown 修复流水线
//!
//! 自由文本字段交给 Markdown 渲染器之前的预处理。

use regex::Regex;
use std::sync::LazyLock;

/// 行首的 `1.` / `2)`，会被渲染器误认成有序列表
static ORDERED_LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\d+)([.)])").unwrap());

/// 依次执行有序列表转义和换行提升
pub fn normalize(text: &str) -> String {
    let text = escape_ordered_list_markers(text);
    promote_single_newlines(&text)
}

/// 在行首数字后的 `.` 或 `)` 前插入反斜杠
pub fn escape_ordered_list_markers(text: &str) -> String {
    ORDERED_LIST_MARKER_RE
        .replace_all(text, r"${1}\${2}")
        .into_owned()
}

/// 单独的 `\n` 提升为 `\n\n`
///
/// 与另一个换行相邻，或者与表格竖线 `|` 相邻的换行保持不变。
pub fn promote_single_newlines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len() + 16);

    for (i, &c) in chars.iter().enumerate() {
        if c != '\n' {
            result.push(c);
            continue;
        }

        let prev = i.checked_sub(1).and_then(|j| chars.get(j)).copied();
        let next = chars.get(i + 1).copied();
        let keeps_single = matches!(prev, Some('\n') | Some('|'))
            || matches!(next, Some('\n') | Some('|'));

        if keeps_single {
            result.push('\n');
        } else {
            result.push_str("\n\n");
        }
    }

    result
}
