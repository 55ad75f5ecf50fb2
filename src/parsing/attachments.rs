//! 脚本中的图片触发调用
//!
//! 题库页面不直接放 `<img>`，而是在 `<script>` 里调用
//! `ShowPictureQ('docs/…/innerimg1.png')` 之类的函数显示图片。

use regex::Regex;
use std::sync::LazyLock;

/// 九年级（ОГЭ）题库
pub const OGE_BANK_URL: &str = "https://oge.fipi.ru/bank/";
/// 十一年级（ЕГЭ）题库
pub const EGE_BANK_URL: &str = "https://ege.fipi.ru/bank/";

static TRIGGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ShowPicture\w*\(\s*'([^']+)'").unwrap());

/// 提取脚本文本中所有触发调用的图片路径（按出现顺序）
pub fn extract_trigger_paths(script: &str) -> Vec<String> {
    TRIGGER_RE
        .captures_iter(script)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// 根据年级选择基础地址
pub fn base_url(grade: Option<&str>) -> &'static str {
    match grade.map(|g| g.trim().to_lowercase()) {
        Some(g) if g == "9" || g == "oge" => OGE_BANK_URL,
        _ => EGE_BANK_URL,
    }
}

/// 把相对路径解析为完整地址，绝对地址原样返回
pub fn resolve_url(path: &str, grade: Option<&str>) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let mut relative = path;
    loop {
        let stripped = relative
            .strip_prefix("../")
            .or_else(|| relative.strip_prefix("./"))
            .or_else(|| relative.strip_prefix('/'));
        match stripped {
            Some(rest) => relative = rest,
            None => break,
        }
    }

    format!("{}{}", base_url(grade), relative)
}
