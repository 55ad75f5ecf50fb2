//! MathML 符号 → LaTeX 命令对照表

use phf::{phf_map, phf_set};

/// `<mo>` 中的运算符
pub static OPERATORS: phf::Map<&'static str, &'static str> = phf_map! {
    "−" => "-",
    "–" => "-",
    "·" => r"\cdot",
    "⋅" => r"\cdot",
    "×" => r"\times",
    "÷" => r"\div",
    "±" => r"\pm",
    "∓" => r"\mp",
    "≤" => r"\leq",
    "⩽" => r"\leq",
    "≥" => r"\geq",
    "⩾" => r"\geq",
    "≠" => r"\neq",
    "≈" => r"\approx",
    "≡" => r"\equiv",
    "∞" => r"\infty",
    "→" => r"\to",
    "⇒" => r"\Rightarrow",
    "⇔" => r"\Leftrightarrow",
    "∈" => r"\in",
    "∉" => r"\notin",
    "∪" => r"\cup",
    "∩" => r"\cap",
    "⊂" => r"\subset",
    "∅" => r"\varnothing",
    "∠" => r"\angle",
    "⊥" => r"\perp",
    "∥" => r"\parallel",
    "△" => r"\triangle",
    "∘" => r"\circ",
    "°" => r"^{\circ}",
    "…" => r"\ldots",
    "∑" => r"\sum",
    "∏" => r"\prod",
    "∫" => r"\int",
    "√" => r"\surd",
    "%" => r"\%",
    "&" => r"\&",
    "#" => r"\#",
    "_" => r"\_",
    "\u{2061}" => "",
    "\u{2062}" => "",
    "\u{2063}" => "",
};

/// `<mi>` 中的单字符标识符
pub static IDENTIFIERS: phf::Map<&'static str, &'static str> = phf_map! {
    "α" => r"\alpha",
    "β" => r"\beta",
    "γ" => r"\gamma",
    "δ" => r"\delta",
    "ε" => r"\varepsilon",
    "θ" => r"\theta",
    "λ" => r"\lambda",
    "μ" => r"\mu",
    "π" => r"\pi",
    "ρ" => r"\rho",
    "σ" => r"\sigma",
    "τ" => r"\tau",
    "φ" => r"\varphi",
    "ω" => r"\omega",
    "Δ" => r"\Delta",
    "Ω" => r"\Omega",
    "∞" => r"\infty",
    "∅" => r"\varnothing",
};

/// LaTeX 自带命令的函数名
pub static FUNCTIONS: phf::Set<&'static str> = phf_set! {
    "sin", "cos", "tan", "cot", "arcsin", "arccos", "arctan",
    "log", "ln", "lg", "exp", "lim", "max", "min",
};

/// 俄式写法的函数名，需要 \operatorname
pub static OPERATOR_NAMES: phf::Set<&'static str> = phf_set! {
    "tg", "ctg", "arctg", "arcctg",
};

/// 开括号
pub fn is_open_fence(op: &str) -> bool {
    matches!(op, "(" | "[" | "{")
}

/// 闭括号
pub fn is_close_fence(op: &str) -> bool {
    matches!(op, ")" | "]" | "}")
}

/// 在 `\left` / `\right` 之后使用的定界符写法
pub fn fence_delimiter(op: &str) -> &str {
    match op {
        "{" => r"\{",
        "}" => r"\}",
        other => other,
    }
}
