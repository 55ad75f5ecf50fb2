//! 文档树渲染器
//!
//! 递归遍历节点树，输出 Markdown + LaTeX 混排的单个字符串。
//! 逐个节点判断内容是正文、语义表格、图片触发脚本还是 MathML 公式。
//!
//! 分派顺序：
//! 1. 公式引擎的预览节点 → 空
//! 2. `table` → Markdown 表格，或展开为纯文本
//! 3. `script` → 图片（行内引用，或提升到题目级别）
//! 4. `math` → ` $LaTeX$ `
//! 5. 通用容器（数学模式下任意标签）→ 子节点拼接
//! 6. `br` → 空格
//! 7. 文本 → 去掉首尾空白的文本
//!
//! 其余标签一律丢弃。

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::ParseError;
use crate::math;
use crate::parsing::attachments;
use crate::parsing::context::{ParsingContext, TraversalOptions};
use crate::parsing::node::RawNode;

/// 公式引擎生成的预览节点，内容与 `<math>` 重复
const PREVIEW_CLASSES: &[&str] = &["MathJax_Preview"];

/// Word 导出的排版表格
const GRID_TABLE_CLASS: &str = "MsoTableGrid";

const CONTAINER_TAGS: &[&str] = &["div", "p", "span", "i", "b", "td"];

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// 逗号、问号以及转义后的 `\.` 与 `\!` 前多余的空格
static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +([,?]|\\[.!])").unwrap());

/// 渲染一个节点
///
/// 除了写入 `ctx` 中的图片列表和计数器以外没有副作用。
pub fn render(
    node: &RawNode,
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    match node {
        RawNode::Text(content) => Ok(render_text(content, options)),
        RawNode::Script(children) => render_script(children, options, ctx),
        RawNode::Tag { name, children, .. } => {
            if node.classes().any(|c| PREVIEW_CLASSES.contains(&c)) {
                return Ok(String::new());
            }

            match name.as_str() {
                "table" => render_table(node, options, ctx),
                "math" => render_math(children, options, ctx),
                tag if options.is_math || CONTAINER_TAGS.contains(&tag) => {
                    render_container(tag, children, options, ctx)
                }
                "br" => Ok(" ".to_string()),
                _ => Ok(String::new()),
            }
        }
    }
}

/// 按文档顺序渲染并拼接一组兄弟节点
pub fn render_all(
    nodes: &[RawNode],
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let mut parts = Vec::with_capacity(nodes.len());
    for node in nodes {
        parts.push(render(node, options, ctx)?);
    }
    Ok(parts.join(" "))
}

/// 把表格单元格当作 `td` 容器渲染（`th` 也一样处理）
pub fn render_cell(
    cell: &RawNode,
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    render_container("td", cell.children(), options, ctx)
}

fn render_text(content: &str, options: TraversalOptions) -> String {
    let text = content.replace('\u{a0}', " ");
    let text = text.trim();
    if options.is_math {
        escape_xml(text)
    } else {
        text.to_string()
    }
}

fn render_container(
    tag: &str,
    children: &[RawNode],
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let joined = render_all(children, options, ctx)?;
    let content = tidy_spacing(&joined);

    if options.is_math {
        return Ok(format!("<{tag}>{content}</{tag}>"));
    }
    if content.trim().is_empty() {
        return Ok(String::new());
    }
    // 已经是公式片段，不再加强调
    if content.trim_start().starts_with('$') {
        return Ok(content);
    }

    Ok(match tag {
        "i" => format!(" *{}* ", content.trim()),
        "b" => format!(" **{}** ", content.trim()),
        _ => content,
    })
}

fn render_math(
    children: &[RawNode],
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let inner = render_all(children, options.math(), ctx)?;
    let fragment = format!("<math>{}</math>", tidy_spacing(&inner));

    let latex = math::to_latex(&fragment).map_err(|e| ParseError::math(&fragment, e))?;
    if latex.is_empty() {
        debug!("公式转换结果为空: {}", fragment);
        return Ok(String::new());
    }

    Ok(format!(" ${}$ ", latex))
}

fn render_script(
    children: &[RawNode],
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let source = render_all(children, options, ctx)?;
    let urls: Vec<String> = attachments::extract_trigger_paths(&source)
        .iter()
        .map(|path| attachments::resolve_url(path, ctx.grade.as_deref()))
        .collect();

    if options.inline_attachments {
        let references: Vec<String> = urls
            .into_iter()
            .map(|url| format!("![Рисунок {}]({})", ctx.next_inline_number(), url))
            .collect();
        return Ok(references.join(" "));
    }

    debug!("提升 {} 张图片到题目级别", urls.len());
    ctx.top_level_attachments.extend(urls);
    Ok(String::new())
}

fn render_table(
    table: &RawNode,
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let Some(body) = table.element_children().find(|c| c.is_tag("tbody")) else {
        return Ok(String::new());
    };
    let rows = section_rows(body);

    let is_single_column = rows.iter().all(|row| row.len() < 2);
    if is_single_column || options.is_non_semantic_table || table.has_class(GRID_TABLE_CLASS) {
        return flatten_table(&rows, options, ctx);
    }

    let columns = rows.first().map_or(0, Vec::len);
    let cell_options = options
        .with_inline_attachments(true)
        .with_non_semantic_table(false);

    let mut lines = vec![
        format!("|{}", "   |".repeat(columns)),
        format!("|{}", " --- |".repeat(columns)),
    ];
    for row in &rows {
        let mut cells = Vec::with_capacity(row.len());
        for cell in row {
            cells.push(render_cell(cell, cell_options, ctx)?.trim().replace('|', r"\|"));
        }
        if cells.iter().all(String::is_empty) {
            continue;
        }
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    Ok(lines.join("\n"))
}

/// 排版用的表格：所有单元格内容直接拼接，图片一律提升到题目级别
fn flatten_table(
    rows: &[Vec<&RawNode>],
    options: TraversalOptions,
    ctx: &mut ParsingContext,
) -> Result<String, ParseError> {
    let flat_options = options.with_inline_attachments(false);
    let mut parts = Vec::new();
    for cell in rows.iter().flatten() {
        let rendered = render_cell(cell, flat_options, ctx)?;
        let rendered = rendered.trim();
        if !rendered.is_empty() {
            parts.push(rendered.to_string());
        }
    }
    Ok(parts.join(" ").trim().to_string())
}

/// 表格的所有行（包括 thead / tbody / tfoot 中的行）
pub fn table_rows(table: &RawNode) -> Vec<Vec<&RawNode>> {
    let mut rows = Vec::new();
    for child in table.element_children() {
        match child.name() {
            Some("thead" | "tbody" | "tfoot") => rows.extend(section_rows(child)),
            Some("tr") => rows.push(row_cells(child)),
            _ => {}
        }
    }
    rows
}

fn section_rows(section: &RawNode) -> Vec<Vec<&RawNode>> {
    section
        .element_children()
        .filter(|c| c.is_tag("tr"))
        .map(row_cells)
        .collect()
}

fn row_cells(row: &RawNode) -> Vec<&RawNode> {
    row.element_children()
        .filter(|c| c.is_tag("td") || c.is_tag("th"))
        .collect()
}

/// 折叠连续空格，去掉标点前的空格
fn tidy_spacing(text: &str) -> String {
    let collapsed = SPACE_RUN_RE.replace_all(text, " ");
    SPACE_BEFORE_PUNCT_RE
        .replace_all(&collapsed, "$1")
        .into_owned()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
