use crate::error::ConfigError;
use std::str::FromStr;

/// 程序配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// 待解析的 HTML 页面目录
    pub html_folder: String,
    /// 题目存储目录（TOML 文件）
    pub store_folder: String,
    /// 年级（"9" 使用 ОГЭ 题库地址，其余使用 ЕГЭ）
    pub grade: Option<String>,
    /// 每页题目数量，用于计算列表序号
    pub page_size: usize,
    /// 页面按分类筛选时为分类代码，此时不计算列表序号
    pub topic_filter: Option<String>,
    /// 考试位置允许的最大值（允许集合为 1..=max）
    pub max_exam_position: i32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            html_folder: "pages".to_string(),
            store_folder: "output_toml".to_string(),
            grade: None,
            page_size: 10,
            topic_filter: None,
            max_exam_position: 30,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    ///
    /// 设置了但无法解析的数值会返回错误，而不是悄悄回退到默认值。
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            html_folder: std::env::var("HTML_FOLDER").unwrap_or(default.html_folder),
            store_folder: std::env::var("STORE_FOLDER").unwrap_or(default.store_folder),
            grade: optional_var("GRADE").or(default.grade),
            page_size: parse_var("PAGE_SIZE", "usize")?.unwrap_or(default.page_size),
            topic_filter: optional_var("TOPIC_FILTER").or(default.topic_filter),
            max_exam_position: parse_var("MAX_EXAM_POSITION", "i32")?
                .unwrap_or(default.max_exam_position),
            verbose_logging: parse_var("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        })
    }
}

/// 读取非空的环境变量
fn optional_var(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    optional_var(var_name)
        .map(|value| parse_value(var_name, &value, expected_type))
        .transpose()
}

fn parse_value<T: FromStr>(var_name: &str, value: &str, expected_type: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    })
}
