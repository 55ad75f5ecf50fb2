//! MathML → LaTeX 结构转换
//!
//! 只做逐元素的结构映射，输出不经过任何修复。括号的处理方式与题库上游
//! 转换器保持一致：同一行内配对的括号输出 `\left … \right`，落单的花括号
//! 和竖线输出单侧定界符（`\left{\right.`），交给修复流水线处理。

use roxmltree::{Document, Node};

use crate::error::MathError;
use crate::math::symbols::{
    fence_delimiter, is_close_fence, is_open_fence, FUNCTIONS, IDENTIFIERS, OPERATORS,
    OPERATOR_NAMES,
};

/// 把一个 `<math>…</math>` 片段转换为 LaTeX
pub fn mathml_to_latex(fragment: &str) -> Result<String, MathError> {
    let doc = Document::parse(fragment)?;
    let root = doc.root_element();
    let name = root.tag_name().name();
    if name != "math" {
        return Err(MathError::UnexpectedRoot(name.to_string()));
    }

    Ok(convert_row(&element_children(root))?.trim().to_string())
}

fn convert(node: Node) -> Result<String, MathError> {
    let name = node.tag_name().name();
    match name {
        "math" | "mrow" | "mstyle" | "mpadded" | "mtd" | "menclose" | "merror" | "semantics" => {
            convert_row(&element_children(node))
        }
        "mi" => Ok(identifier(&token_text(node))),
        "mn" => Ok(token_text(node)),
        "mo" => Ok(operator(&token_text(node))),
        "mtext" => Ok(text(&token_text(node))),
        "ms" => Ok(format!("\"{}\"", token_text(node))),
        "mspace" => Ok(" ".to_string()),
        "mphantom" | "annotation" | "annotation-xml" | "none" => Ok(String::new()),
        "mfrac" => {
            let [num, den] = children_exact::<2>(node)?;
            Ok(format!(r"\frac{{{}}}{{{}}}", convert(num)?, convert(den)?))
        }
        "msqrt" => Ok(format!(r"\sqrt{{{}}}", convert_row(&element_children(node))?)),
        "mroot" => {
            let [base, index] = children_exact::<2>(node)?;
            Ok(format!(r"\sqrt[{}]{{{}}}", convert(index)?, convert(base)?))
        }
        "msub" => {
            let [base, sub] = children_exact::<2>(node)?;
            Ok(format!("{}_{{{}}}", group(&convert(base)?), convert(sub)?))
        }
        "msup" => {
            let [base, sup] = children_exact::<2>(node)?;
            Ok(format!("{}^{{{}}}", group(&convert(base)?), convert(sup)?))
        }
        "msubsup" | "munderover" => {
            let [base, sub, sup] = children_exact::<3>(node)?;
            Ok(format!(
                "{}_{{{}}}^{{{}}}",
                group(&convert(base)?),
                convert(sub)?,
                convert(sup)?
            ))
        }
        "munder" => {
            let [base, under] = children_exact::<2>(node)?;
            convert_under(base, under)
        }
        "mover" => {
            let [base, over] = children_exact::<2>(node)?;
            convert_over(base, over)
        }
        "mtable" => {
            let rows = element_children(node)
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows.join(r" \\ "))
        }
        "mtr" | "mlabeledtr" => {
            let cells = element_children(node)
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(cells.join(" & "))
        }
        "mfenced" => convert_fenced(node),
        other => Err(MathError::UnsupportedElement(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fence {
    Open,
    Close,
    Bar,
}

#[derive(Debug)]
enum Piece {
    Token(String),
    Fence(Fence, String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Left,
    Right,
}

/// 转换一行子元素，并在行内配对括号
fn convert_row(children: &[Node]) -> Result<String, MathError> {
    let mut pieces = Vec::with_capacity(children.len());
    for child in children {
        let piece = if child.tag_name().name() == "mo" {
            let op = token_text(*child);
            if is_open_fence(&op) {
                Piece::Fence(Fence::Open, op)
            } else if is_close_fence(&op) {
                Piece::Fence(Fence::Close, op)
            } else if op == "|" {
                Piece::Fence(Fence::Bar, op)
            } else {
                Piece::Token(operator(&op))
            }
        } else {
            Piece::Token(convert(*child)?)
        };
        pieces.push(piece);
    }

    let mut sides: Vec<Option<Side>> = vec![None; pieces.len()];
    let mut stack: Vec<(usize, Fence)> = Vec::new();
    for (i, piece) in pieces.iter().enumerate() {
        let Piece::Fence(kind, _) = piece else {
            continue;
        };
        match kind {
            Fence::Open => stack.push((i, Fence::Open)),
            // 闭括号只和栈顶的开括号配对，栈顶是竖线时原样输出
            Fence::Close => {
                if let Some(&(j, Fence::Open)) = stack.last() {
                    stack.pop();
                    sides[j] = Some(Side::Left);
                    sides[i] = Some(Side::Right);
                }
            }
            Fence::Bar => match stack.last() {
                Some(&(j, Fence::Bar)) => {
                    stack.pop();
                    sides[j] = Some(Side::Left);
                    sides[i] = Some(Side::Right);
                }
                _ => stack.push((i, Fence::Bar)),
            },
        }
    }

    let mut out = String::new();
    for (piece, side) in pieces.iter().zip(sides) {
        match piece {
            Piece::Token(token) => push_token(&mut out, token),
            Piece::Fence(_, op) => {
                let token = match side {
                    Some(Side::Left) => format!(r"\left{}", fence_delimiter(op)),
                    Some(Side::Right) => format!(r"\right{}", fence_delimiter(op)),
                    None => unmatched_fence(op),
                };
                push_token(&mut out, &token);
            }
        }
    }

    Ok(out)
}

/// 行内没有配对的括号
///
/// 花括号和竖线按上游转换器的写法输出单侧定界符，其余括号原样输出。
fn unmatched_fence(op: &str) -> String {
    match op {
        "{" => r"\left{\right.".to_string(),
        "|" => r"\left|\right.".to_string(),
        "}" => r"\}".to_string(),
        other => other.to_string(),
    }
}

fn convert_fenced(node: Node) -> Result<String, MathError> {
    let open = node.attribute("open").unwrap_or("(");
    let close = node.attribute("close").unwrap_or(")");
    let separator = node
        .attribute("separators")
        .and_then(|s| s.trim().chars().next())
        .unwrap_or(',');

    let items = element_children(node)
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()?;

    let open = if open.is_empty() { "." } else { fence_delimiter(open) };
    let close = if close.is_empty() { "." } else { fence_delimiter(close) };
    Ok(format!(
        r"\left{} {} \right{}",
        open,
        items.join(&separator.to_string()),
        close
    ))
}

fn convert_under(base: Node, under: Node) -> Result<String, MathError> {
    let base_latex = convert(base)?;
    let under_raw = token_text(under);
    if matches!(under_raw.as_str(), "_" | "\u{332}" | "¯") {
        return Ok(format!(r"\underline{{{}}}", base_latex));
    }

    let under_latex = convert(under)?;
    let is_limit_like = matches!(
        base_latex.as_str(),
        r"\lim" | r"\max" | r"\min" | r"\sum" | r"\prod" | r"\int"
    );
    if is_limit_like {
        Ok(format!("{}_{{{}}}", base_latex, under_latex))
    } else {
        Ok(format!(r"\underset{{{}}}{{{}}}", under_latex, base_latex))
    }
}

fn convert_over(base: Node, over: Node) -> Result<String, MathError> {
    let base_latex = convert(base)?;
    let accent = match token_text(over).as_str() {
        "¯" | "‾" | "―" | "_" => Some(r"\overline"),
        "→" | "\u{20D7}" => Some(r"\vec"),
        "^" | "ˆ" => Some(r"\hat"),
        "~" | "˜" => Some(r"\tilde"),
        "˙" | "." => Some(r"\dot"),
        "⌢" | "◡" => Some(r"\overset{\frown}"),
        _ => None,
    };

    match accent {
        Some(command) => Ok(format!("{}{{{}}}", command, base_latex)),
        None => Ok(format!(r"\overset{{{}}}{{{}}}", convert(over)?, base_latex)),
    }
}

fn identifier(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    if let Some(latex) = IDENTIFIERS.get(name) {
        return latex.to_string();
    }
    if FUNCTIONS.contains(name) {
        return format!(r"\{}", name);
    }
    if OPERATOR_NAMES.contains(name) {
        return format!(r"\operatorname{{{}}}", name);
    }
    if name.chars().count() == 1 || name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return name.to_string();
    }
    format!(r"\text{{{}}}", name)
}

fn operator(op: &str) -> String {
    if let Some(latex) = OPERATORS.get(op) {
        return latex.to_string();
    }
    match op {
        "{" => r"\{".to_string(),
        "}" => r"\}".to_string(),
        other => other.to_string(),
    }
}

fn text(content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!(r"\text{{{}}}", content)
    }
}

/// 多字符的底数加花括号，避免脚标只作用在最后一个字符上
fn group(latex: &str) -> String {
    let is_command = latex.starts_with('\\')
        && latex.len() > 1
        && latex[1..].chars().all(|c| c.is_ascii_alphabetic());
    if latex.chars().count() <= 1 || is_command {
        latex.to_string()
    } else {
        format!("{{{}}}", latex)
    }
}

/// 拼接记号，命令名后紧跟字母时补一个空格
fn push_token(out: &mut String, token: &str) {
    if token.is_empty() {
        return;
    }

    let ends_with_command = out.rfind('\\').is_some_and(|idx| {
        let tail = &out[idx + 1..];
        !tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphabetic())
    });
    if ends_with_command && token.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.push(' ');
    }
    out.push_str(token);
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    node.children().filter(|child| child.is_element()).collect()
}

fn children_exact<'a, 'input, const N: usize>(
    node: Node<'a, 'input>,
) -> Result<[Node<'a, 'input>; N], MathError> {
    let children = element_children(node);
    let actual = children.len();
    children.try_into().map_err(|_| MathError::Arity {
        element: node.tag_name().name().to_string(),
        expected: N,
        actual,
    })
}

fn token_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}
