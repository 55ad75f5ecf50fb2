//! LaTeX 修复流水线
//!
//! 修正 MathML 转换器和 AI 补全环节产生的畸形 LaTeX。
//! 每一步都是幂等的，对不需要修复的文本不做任何改动。

use regex::Regex;
use std::sync::LazyLock;

/// `\left( \right.` 或 `\left. \right)` 这类只有一侧真实括号的定界符
static SIDED_DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\left\s*([(\[{])\s*\\right\s*\.|\\left\s*\.\s*\\right\s*([)\]}])").unwrap()
});

/// 绝对值竖线的同类畸形：`\left|\right.` 与 `\left.\right|`
static PIPE_DELIMITER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\left\s*\|\s*\\right\s*\.|\\left\s*\.\s*\\right\s*\|").unwrap()
});

static EMPTY_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_^]\{\}").unwrap());

const CASES_OPEN: &str = r"\left{";
const CASES_CLOSE: &str = r"\right}";
const BEGIN_CASES: &str = r"\begin{cases}";
const END_CASES: &str = r"\end{cases}";

/// 按固定顺序执行全部五个修复步骤
///
/// 后面的步骤可能为前面的步骤制造新的匹配（如删掉 `\fr^{}ac` 中的空上标），
/// 所以整条流水线重复执行直到结果不再变化。
pub fn repair(latex: &str) -> String {
    until_stable(latex, |latex| {
        let latex = normalize_fractions(latex);
        let latex = repair_sided_delimiters(&latex);
        let latex = repair_pipe_delimiters(&latex);
        let latex = repair_cases_blocks(&latex);
        remove_empty_scripts(&latex)
    })
}

/// 反复执行 `step` 直到输出等于输入
fn until_stable(latex: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = latex.to_string();
    loop {
        let next = step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// `\frac` 统一改为 `\dfrac`
pub fn normalize_fractions(latex: &str) -> String {
    latex.replace(r"\frac", r"\dfrac")
}

/// 单侧定界符修复
///
/// 开括号改写为 `\left<括号>`，闭括号改写为 `\right<括号>`。
/// 替换后可能露出新的 `\right.`，重复替换直到没有匹配。
pub fn repair_sided_delimiters(latex: &str) -> String {
    until_stable(latex, |latex| {
        SIDED_DELIMITER_RE
            .replace_all(latex, |caps: &regex::Captures| {
                if let Some(open) = caps.get(1) {
                    format!(r"\left{}", open.as_str())
                } else {
                    let close = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                    format!(r"\right{}", close)
                }
            })
            .into_owned()
    })
}

/// 单侧竖线定界符改为普通的 `|`
pub fn repair_pipe_delimiters(latex: &str) -> String {
    until_stable(latex, |latex| PIPE_DELIMITER_RE.replace_all(latex, "|").into_owned())
}

/// 把没有配对 `\right}` 的 `\left{` 改写成 cases 环境
///
/// 从左到右扫描，遇到 `\left{` 记录位置入栈，遇到 `\right}` 出栈。
/// 扫描结束后栈里剩下的就是未配对的开括号：从最内层（最后入栈）到最外层依次
/// 替换为 `\begin{cases}`，并按同样顺序在末尾追加 `\end{cases}`。
pub fn repair_cases_blocks(latex: &str) -> String {
    let mut unmatched: Vec<usize> = Vec::new();
    let mut pos = 0;

    while pos < latex.len() {
        let rest = &latex[pos..];
        if rest.starts_with(CASES_OPEN) {
            unmatched.push(pos);
            pos += CASES_OPEN.len();
        } else if rest.starts_with(CASES_CLOSE) {
            unmatched.pop();
            pos += CASES_CLOSE.len();
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    if unmatched.is_empty() {
        return latex.to_string();
    }

    let mut result = latex.to_string();
    // 从后往前替换，前面记录的下标不受影响
    for &index in unmatched.iter().rev() {
        result.replace_range(index..index + CASES_OPEN.len(), BEGIN_CASES);
    }
    for _ in &unmatched {
        result.push_str(END_CASES);
    }
    result
}

/// 删除空的下标 `_{}` 和上标 `^{}`
///
/// 嵌套的空脚标（如 `_{_{}}`）一次调用内全部删除。
pub fn remove_empty_scripts(latex: &str) -> String {
    until_stable(latex, |latex| EMPTY_SCRIPT_RE.replace_all(latex, "").into_owned())
}

/// 合并跨行的 `$…$` 行内公式
///
/// AI 返回的文本里行内公式经常被换行拆开。含有奇数个 `$` 的行会开启缓冲，
/// 之后的行都进入缓冲，直到再遇到一个奇数行为止，缓冲内容直接拼接成一行。
/// 到文本末尾仍未闭合的缓冲原样输出。
pub fn fix_hanging_dollar_sign_delimiters(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        let odd = count_unescaped_dollars(line) % 2 == 1;
        if buffer.is_empty() {
            if odd {
                buffer.push(line);
            } else {
                lines.push(line.to_string());
            }
            continue;
        }

        buffer.push(line);
        if odd {
            lines.push(buffer.concat());
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        lines.push(buffer.join("\n"));
    }

    lines.join("\n")
}

fn count_unescaped_dollars(line: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '$' => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fractions() {
        assert_eq!(normalize_fractions(r"\frac{1}{2}"), r"\dfrac{1}{2}");
        assert_eq!(normalize_fractions(r"\dfrac{1}{2}"), r"\dfrac{1}{2}");
    }

    #[test]
    fn test_sided_delimiters() {
        assert_eq!(repair_sided_delimiters(r"\left(\right."), r"\left(");
        assert_eq!(repair_sided_delimiters(r"\left.\right)"), r"\right)");
        assert_eq!(repair_sided_delimiters(r"\left[ \right."), r"\left[");
        assert_eq!(repair_sided_delimiters(r"\left( x \right)"), r"\left( x \right)");
    }

    #[test]
    fn test_pipe_delimiters() {
        assert_eq!(repair_pipe_delimiters(r"\left|\right.x\left.\right|"), "|x|");
        assert_eq!(repair_pipe_delimiters(r"\left| x \right|"), r"\left| x \right|");
    }

    #[test]
    fn test_cases_single_unmatched() {
        let result = repair_cases_blocks(r"\left{a \\ b");
        assert_eq!(result, r"\begin{cases}a \\ b\end{cases}");
        assert_eq!(result.matches(END_CASES).count(), 1);
    }

    #[test]
    fn test_cases_two_unmatched() {
        let result = repair_cases_blocks(r"\left{a \left{b \\ c");
        assert_eq!(
            result,
            r"\begin{cases}a \begin{cases}b \\ c\end{cases}\end{cases}"
        );
    }

    #[test]
    fn test_cases_matched_pair_untouched() {
        let input = r"\left{a\right} + \left{b";
        assert_eq!(
            repair_cases_blocks(input),
            r"\left{a\right} + \begin{cases}b\end{cases}"
        );
    }

    #[test]
    fn test_cases_stray_close_ignored() {
        assert_eq!(repair_cases_blocks(r"a\right}"), r"a\right}");
    }

    #[test]
    fn test_remove_empty_scripts() {
        assert_eq!(remove_empty_scripts("x_{}^{2}"), "x^{2}");
        assert_eq!(remove_empty_scripts("x_{_{}}"), "x");
    }

    #[test]
    fn test_repair_is_idempotent() {
        let samples = [
            r"\frac{1}{2}",
            r"\left(\right. x+1",
            r"\left{\right. x>0 \\ x<3",
            r"\left|\right.x\left.\right|",
            r"\left{a \left{b \\ c",
            r"x_{}^{}",
            r"\left\{ a \right\}",
            "plain text",
        ];
        for sample in samples {
            let once = repair(sample);
            assert_eq!(repair(&once), once, "input: {}", sample);
        }
    }

    /// 容易出问题的输入：一次替换后才露出新匹配
    const TRICKY_SAMPLES: [&str; 6] = [
        r"\left(\right.\right.",
        r"\left._{}\right)",
        r"\fr^{}ac{1}{2}",
        r"\left|\right.\right.",
        r"\left.\left.\right|\right)",
        r"x_{_{^{}}}",
    ];

    fn assert_idempotent(name: &str, transform: fn(&str) -> String) {
        for sample in TRICKY_SAMPLES {
            let once = transform(sample);
            assert_eq!(transform(&once), once, "{}: {}", name, sample);
        }
    }

    #[test]
    fn test_normalize_fractions_is_idempotent() {
        assert_idempotent("normalize_fractions", normalize_fractions);
        assert_eq!(normalize_fractions(&normalize_fractions(r"\frac{1}{2}")), r"\dfrac{1}{2}");
    }

    #[test]
    fn test_sided_delimiters_is_idempotent() {
        assert_idempotent("repair_sided_delimiters", repair_sided_delimiters);
        // 替换后露出的 `\right.` 在同一次调用内处理掉
        assert_eq!(repair_sided_delimiters(r"\left(\right.\right."), r"\left(");
    }

    #[test]
    fn test_pipe_delimiters_is_idempotent() {
        assert_idempotent("repair_pipe_delimiters", repair_pipe_delimiters);
        assert_eq!(repair_pipe_delimiters(r"\left|\right.\right."), r"|\right.");
    }

    #[test]
    fn test_cases_blocks_is_idempotent() {
        assert_idempotent("repair_cases_blocks", repair_cases_blocks);
        let once = repair_cases_blocks(r"\left{a \left{b\right} \\ c");
        assert_eq!(repair_cases_blocks(&once), once);
    }

    #[test]
    fn test_remove_empty_scripts_is_idempotent() {
        assert_idempotent("remove_empty_scripts", remove_empty_scripts);
    }

    #[test]
    fn test_repair_reaches_fixed_point_in_one_call() {
        assert_idempotent("repair", repair);
        // 删掉空脚标后才形成的定界符和分数，同一次调用内也要修好
        assert_eq!(repair(r"\left._{}\right)"), r"\right)");
        assert_eq!(repair(r"\fr^{}ac{1}{2}"), r"\dfrac{1}{2}");
        assert_eq!(repair(r"\left(\right.\right."), r"\left(");
    }

    #[test]
    fn test_repair_combines_sided_and_cases() {
        assert_eq!(
            repair(r"\left{\right.x>0 \\ x<3"),
            r"\begin{cases}x>0 \\ x<3\end{cases}"
        );
    }

    #[test]
    fn test_hanging_dollar_lines_merge() {
        let input = ["some $x", "+ y$ more"].join("\n");
        assert_eq!(fix_hanging_dollar_sign_delimiters(&input), "some $x+ y$ more");
    }

    #[test]
    fn test_hanging_dollar_buffers_middle_lines() {
        let input = "a $x\n+ y\n- z$ b\nnext $k$";
        assert_eq!(
            fix_hanging_dollar_sign_delimiters(input),
            "a $x+ y- z$ b\nnext $k$"
        );
    }

    #[test]
    fn test_hanging_dollar_unclosed_kept() {
        let input = "a $x\nb";
        assert_eq!(fix_hanging_dollar_sign_delimiters(input), input);
    }

    #[test]
    fn test_hanging_dollar_ignores_escaped() {
        let input = format!("{}\nnext", r"cost \$5");
        assert_eq!(fix_hanging_dollar_sign_delimiters(&input), input);
    }
}
