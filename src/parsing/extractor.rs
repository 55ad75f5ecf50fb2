//! 题目 / 选项抽取
//!
//! 在渲染器之上按固定的页面结构抽取题目块和信息块。
//!
//! 题目块（`div.qblock`）：
//! - `input[name="guid"]` 的 value 是题目 ID
//! - `.hint` 是题目标签，形如 `Задание №5. Решите уравнение`
//! - `td.cell_0` 的直接子节点是题干
//! - `table.distractors-table` 每行最后一个单元格是一个选项
//! - `table.answer-table` 首行是分组标题，末行每个 `<select>` 是一组候选值
//!
//! 信息块（紧跟在题目块后面的兄弟元素）：
//! - `.canselect` 是题目的标准名称
//! - `td.param-name` 标记的属性行：`Тип ответа:` 和 `КЭС:`

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::models::{ParsedIBlock, ParsedQBlock, QuestionOption, SolutionType};
use crate::parsing::context::{ParsingContext, TraversalOptions};
use crate::parsing::node::RawNode;
use crate::parsing::renderer::{render, render_cell, table_rows};

pub const QBLOCK_CLASS: &str = "qblock";
const ID_INPUT_NAME: &str = "guid";
const LABEL_CLASS: &str = "hint";
const CONTENT_CELL_CLASS: &str = "cell_0";
const DISTRACTOR_TABLE_CLASS: &str = "distractors-table";
const ANSWER_TABLE_CLASS: &str = "answer-table";

const NAME_CLASS: &str = "canselect";
const PARAM_NAME_CLASS: &str = "param-name";
const SOLUTION_TYPE_LABEL: &str = "Тип ответа:";
const TOPICS_LABEL: &str = "КЭС:";

/// `Задание №<N>. <题目>`，前缀可选
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?:Задание №([^.\s]*)\.\s)?(.*)$").unwrap());

/// 解析题目块
///
/// # 返回
/// - `Ok(None)`：缺少题目 ID，无法入库
/// - `Err(_)`：公式转换失败，整个题目块作废
pub fn parse_qblock(
    block: &RawNode,
    ctx: &mut ParsingContext,
) -> Result<Option<ParsedQBlock>, ParseError> {
    let id = block
        .find_first(|n| n.is_tag("input") && n.attr("name") == Some(ID_INPUT_NAME))
        .and_then(|input| input.attr("value"))
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let Some(id) = id else {
        debug!("题目块缺少 ID，跳过");
        return Ok(None);
    };

    let label = block
        .find_first(|n| n.has_class(LABEL_CLASS))
        .map(RawNode::text_content)
        .unwrap_or_default();
    let (exam_position, prompt) = parse_label(&label);

    let body = match block.find_first(|n| n.is_tag("td") && n.has_class(CONTENT_CELL_CLASS)) {
        Some(cell) => render_body(cell.children(), ctx)?,
        None => String::new(),
    };

    let mut options = parse_distractors(block, ctx)?;
    options.extend(parse_answer_groups(block));

    Ok(Some(ParsedQBlock {
        id: id.to_string(),
        prompt,
        body,
        attachments: ctx.top_level_attachments.clone(),
        options,
        exam_position,
    }))
}

/// 拆出考试位置和题目标签
///
/// 位置必须是能原样往返的整数（"05" 不算）。
pub fn parse_label(label: &str) -> (Option<i32>, String) {
    let label = label.trim();
    let Some(caps) = LABEL_RE.captures(label) else {
        return (None, label.to_string());
    };

    let exam_position = caps.get(1).and_then(|m| {
        let raw = m.as_str();
        raw.parse::<i32>().ok().filter(|n| n.to_string() == raw)
    });
    let prompt = caps.get(2).map_or(label, |m| m.as_str()).trim().to_string();

    (exam_position, prompt)
}

/// 渲染题干
///
/// 先渲染非表格节点，确定是否存在独立的正文；只有存在正文时表格才按
/// 真正的表格渲染，否则表格就是整个题干，需要展开。最后按文档顺序拼接。
fn render_body(nodes: &[RawNode], ctx: &mut ParsingContext) -> Result<String, ParseError> {
    let options = TraversalOptions::default();
    let mut parts: Vec<Option<String>> = vec![None; nodes.len()];
    let mut has_non_table_content = false;

    for (i, node) in nodes.iter().enumerate() {
        if node.is_tag("table") {
            continue;
        }
        let rendered = render(node, options, ctx)?;
        if !rendered.trim().is_empty() {
            has_non_table_content = true;
        }
        parts[i] = Some(rendered);
    }

    let table_options = options.with_non_semantic_table(!has_non_table_content);
    for (i, node) in nodes.iter().enumerate() {
        if node.is_tag("table") {
            parts[i] = Some(render(node, table_options, ctx)?);
        }
    }

    Ok(parts
        .into_iter()
        .flatten()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// 单选/多选题的选项：每行最后一个单元格，从 1 开始编号
fn parse_distractors(
    block: &RawNode,
    ctx: &mut ParsingContext,
) -> Result<Vec<QuestionOption>, ParseError> {
    let Some(table) =
        block.find_first(|n| n.is_tag("table") && n.has_class(DISTRACTOR_TABLE_CLASS))
    else {
        return Ok(Vec::new());
    };

    let options = TraversalOptions::default().with_inline_attachments(true);
    let mut result = Vec::new();
    // 每行一个选项，编号取行号，空单元格也占位
    for (index, row) in table_rows(table).iter().enumerate() {
        let text = match row.last() {
            Some(last) => render_cell(last, options, ctx)?,
            None => String::new(),
        };
        result.push(QuestionOption::new((index + 1).to_string(), text.trim()));
    }

    Ok(result)
}

/// 分组匹配题：末行每个下拉框的候选值用 `|` 连接
///
/// 分组标题取首行对应位置的单元格，没有则用 1 开始的序号。
fn parse_answer_groups(block: &RawNode) -> Vec<QuestionOption> {
    let Some(table) = block.find_first(|n| n.is_tag("table") && n.has_class(ANSWER_TABLE_CLASS))
    else {
        return Vec::new();
    };

    let rows = table_rows(table);
    let Some(last) = rows.last() else {
        return Vec::new();
    };
    let header = if rows.len() > 1 { rows.first() } else { None };

    let selects: Vec<&RawNode> = last
        .iter()
        .flat_map(|cell| cell.find_all(|n| n.is_tag("select")))
        .collect();

    let mut result = Vec::new();
    for (i, select) in selects.into_iter().enumerate() {
        let candidates: Vec<String> = select
            .find_all(|n| n.is_tag("option"))
            .into_iter()
            .map(RawNode::text_content)
            .filter(|value| !value.is_empty())
            .collect();
        if candidates.is_empty() {
            debug!("第 {} 个下拉框没有候选值，跳过", i + 1);
            continue;
        }

        let heading = header
            .and_then(|cells| cells.get(i))
            .map(|cell| cell.text_content())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| (i + 1).to_string());

        result.push(QuestionOption::new(heading, candidates.join("|")));
    }

    result
}

/// 解析信息块
///
/// 缺少标准名称时返回 `Ok(None)`；未知的答题方式按详细解答处理。
pub fn parse_iblock(block: &RawNode) -> Result<Option<ParsedIBlock>, ParseError> {
    let name = block
        .find_first(|n| n.has_class(NAME_CLASS))
        .map(RawNode::text_content)
        .filter(|name| !name.is_empty());
    let Some(name) = name else {
        debug!("信息块缺少题目名称，跳过");
        return Ok(None);
    };

    let solution_type = match property_value(block, SOLUTION_TYPE_LABEL) {
        Some(cell) => SolutionType::classify(&cell.text_content()),
        None => {
            warn!("信息块 {} 缺少答题方式，按详细解答处理", name);
            SolutionType::Long
        }
    };

    let topic_ids = match property_value(block, TOPICS_LABEL) {
        Some(cell) => parse_topic_ids(cell)?,
        None => Vec::new(),
    };

    Ok(Some(ParsedIBlock {
        name,
        solution_type,
        topic_ids,
    }))
}

/// 每行渲染后的第一个词就是分类代码
fn parse_topic_ids(cell: &RawNode) -> Result<Vec<String>, ParseError> {
    let mut ctx = ParsingContext::default();
    let mut topic_ids = Vec::new();
    for row in cell.children() {
        let rendered = render(row, TraversalOptions::default(), &mut ctx)?;
        if let Some(token) = rendered.split_whitespace().next() {
            topic_ids.push(token.to_string());
        }
    }
    Ok(topic_ids)
}

/// 属性行中标签单元格之后的那个单元格
fn property_value<'a>(block: &'a RawNode, label: &str) -> Option<&'a RawNode> {
    block.find_all(|n| n.is_tag("tr")).into_iter().find_map(|row| {
        let cells: Vec<&RawNode> = row.element_children().filter(|c| c.is_tag("td")).collect();
        let position = cells
            .iter()
            .position(|c| c.has_class(PARAM_NAME_CLASS) && c.text_content() == label)?;
        cells.get(position + 1).copied()
    })
}

/// 找出页面上所有题目块，以及紧随其后的兄弟元素（信息块）
pub fn find_block_pairs(root: &RawNode) -> Vec<(&RawNode, Option<&RawNode>)> {
    let mut pairs = Vec::new();
    collect_block_pairs(root, &mut pairs);
    pairs
}

fn collect_block_pairs<'a>(node: &'a RawNode, pairs: &mut Vec<(&'a RawNode, Option<&'a RawNode>)>) {
    let siblings: Vec<&RawNode> = node
        .children()
        .iter()
        .filter(|c| c.is_element())
        .collect();

    for (i, sibling) in siblings.iter().enumerate() {
        if sibling.has_class(QBLOCK_CLASS) {
            pairs.push((*sibling, siblings.get(i + 1).copied()));
        } else {
            collect_block_pairs(sibling, pairs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_with_class<'a>(root: &'a RawNode, class: &str) -> &'a RawNode {
        root.find_all(|n| n.is_element())
            .into_iter()
            .find(|n| n.has_class(class))
            .unwrap()
    }

    fn qblock_html(content: &str) -> String {
        format!(
            r#"<div class="qblock">
                <input type="hidden" name="guid" value="40B442">
                <div class="hint">Задание №5. Решите задачу</div>
                <table><tr><td class="cell_0">{}</td></tr></table>
            </div>"#,
            content
        )
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label("Задание №5. Решите уравнение"),
            (Some(5), "Решите уравнение".to_string())
        );
        assert_eq!(
            parse_label("Решите уравнение"),
            (None, "Решите уравнение".to_string())
        );
        assert_eq!(parse_label("Задание №05. Текст"), (None, "Текст".to_string()));
        assert_eq!(parse_label("Задание №x. Текст"), (None, "Текст".to_string()));
    }

    #[test]
    fn test_qblock_without_id_is_absent() {
        let root = RawNode::parse_html(r#"<div class="qblock"><div class="hint">Вопрос</div></div>"#);
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        assert_eq!(parse_qblock(block, &mut ctx).unwrap(), None);
    }

    #[test]
    fn test_prose_with_table_keeps_grid() {
        let root = RawNode::parse_html(&qblock_html(
            "<p>Заполните таблицу.</p><table><tr><td>x</td><td>1</td></tr><tr><td>y</td><td>2</td></tr></table>",
        ));
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        let parsed = parse_qblock(block, &mut ctx).unwrap().unwrap();

        assert_eq!(parsed.id, "40B442");
        assert_eq!(parsed.prompt, "Решите задачу");
        assert_eq!(parsed.exam_position, Some(5));
        assert_eq!(
            parsed.body,
            "Заполните таблицу.\n\n|   |   |\n| --- | --- |\n| x | 1 |\n| y | 2 |"
        );
    }

    #[test]
    fn test_table_only_body_is_flattened() {
        let root = RawNode::parse_html(&qblock_html(
            "<table><tr><td>Найдите значение выражения</td></tr></table>",
        ));
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        let parsed = parse_qblock(block, &mut ctx).unwrap().unwrap();

        assert_eq!(parsed.body, "Найдите значение выражения");
        assert!(!parsed.body.contains('|'));
    }

    #[test]
    fn test_table_only_multi_column_is_flattened() {
        let root = RawNode::parse_html(&qblock_html(
            "<table><tr><td>Текст</td><td><script>ShowPictureQ('docs/A/1.png')</script></td></tr></table>",
        ));
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        let parsed = parse_qblock(block, &mut ctx).unwrap().unwrap();

        assert_eq!(parsed.body, "Текст");
        assert_eq!(
            parsed.attachments,
            vec!["https://ege.fipi.ru/bank/docs/A/1.png"]
        );
    }

    #[test]
    fn test_distractor_options() {
        let html = r#"<div class="qblock">
            <input type="hidden" name="guid" value="B7">
            <table><tr><td class="cell_0"><p>Выберите ответ</p></td></tr></table>
            <table class="distractors-table">
              <tr><td>1)</td><td>первый</td></tr>
              <tr><td>2)</td><td></td></tr>
              <tr><td>3)</td><td><math><mn>3</mn></math></td></tr>
            </table>
        </div>"#;
        let root = RawNode::parse_html(html);
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        let parsed = parse_qblock(block, &mut ctx).unwrap().unwrap();

        assert_eq!(parsed.body, "Выберите ответ");
        assert_eq!(parsed.exam_position, None);
        assert_eq!(
            parsed.options,
            vec![
                QuestionOption::new("1", "первый"),
                QuestionOption::new("2", ""),
                QuestionOption::new("3", "$3$"),
            ]
        );
    }

    #[test]
    fn test_answer_group_options() {
        let html = r#"<div class="qblock">
            <input type="hidden" name="guid" value="A1">
            <table class="answer-table">
              <tr><td>А</td><td></td></tr>
              <tr>
                <td><select><option></option><option>1</option><option>2</option></select></td>
                <td><select><option>3</option><option>4</option></select></td>
              </tr>
            </table>
        </div>"#;
        let root = RawNode::parse_html(html);
        let block = first_with_class(&root, "qblock");
        let mut ctx = ParsingContext::default();
        let parsed = parse_qblock(block, &mut ctx).unwrap().unwrap();

        assert_eq!(
            parsed.options,
            vec![
                QuestionOption::new("А", "1|2"),
                QuestionOption::new("2", "3|4"),
            ]
        );
    }

    fn iblock_html(solution_label: &str) -> String {
        format!(
            r#"<div class="iblock">
                <span class="canselect">40B442</span>
                <table>
                  <tr><td class="param-name">КЭС:</td>
                      <td><div>2.1 Целые числа</div><div> </div><div>3.4 Уравнения</div></td></tr>
                  <tr><td class="param-name">Тип ответа:</td><td>{}</td></tr>
                </table>
            </div>"#,
            solution_label
        )
    }

    #[test]
    fn test_parse_iblock() {
        let root = RawNode::parse_html(&iblock_html("Краткий ответ"));
        let block = first_with_class(&root, "iblock");
        let parsed = parse_iblock(block).unwrap().unwrap();

        assert_eq!(parsed.name, "40B442");
        assert_eq!(parsed.solution_type, SolutionType::Short);
        assert_eq!(parsed.topic_ids, vec!["2.1", "3.4"]);
    }

    #[test]
    fn test_iblock_unknown_solution_type_defaults_to_long() {
        let root = RawNode::parse_html(&iblock_html("Новый тип"));
        let block = first_with_class(&root, "iblock");
        let parsed = parse_iblock(block).unwrap().unwrap();
        assert_eq!(parsed.solution_type, SolutionType::Long);
    }

    #[test]
    fn test_iblock_without_name_is_absent() {
        let root = RawNode::parse_html(r#"<div class="iblock"><table></table></div>"#);
        let block = first_with_class(&root, "iblock");
        assert_eq!(parse_iblock(block).unwrap(), None);
    }

    #[test]
    fn test_find_block_pairs() {
        let html = r#"<div id="list">
            <div class="qblock" id="q1"></div><div class="iblock" id="i1"></div>
            <div class="qblock" id="q2"></div>
        </div>"#;
        let root = RawNode::parse_html(html);
        let pairs = find_block_pairs(&root);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.attr("id"), Some("q1"));
        assert_eq!(pairs[0].1.and_then(|n| n.attr("id")), Some("i1"));
        assert_eq!(pairs[1].0.attr("id"), Some("q2"));
        assert!(pairs[1].1.is_none());
    }
}
