use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 题目存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// MathML → LaTeX 转换错误
///
/// 公式转换失败不会被静默吞掉，会一直向上传到所在的题目块。
#[derive(Debug, Error)]
pub enum MathError {
    /// MathML 片段不是合法的 XML
    #[error("MathML 片段解析失败: {0}")]
    Xml(#[from] roxmltree::Error),
    /// 片段的根节点不是 <math>
    #[error("MathML 根节点应为 <math>，实际为 <{0}>")]
    UnexpectedRoot(String),
    /// 不支持的 MathML 元素
    #[error("不支持的 MathML 元素: <{0}>")]
    UnsupportedElement(String),
    /// 元素的子节点数量不符合要求（如 mfrac 需要两个子节点）
    #[error("<{element}> 需要 {expected} 个子元素，实际为 {actual}")]
    Arity {
        element: String,
        expected: usize,
        actual: usize,
    },
}

/// 题目块解析错误
///
/// 注意：缺失必需元素（id、表格主体等）不算错误，解析函数返回 `None`。
#[derive(Debug, Error)]
pub enum ParseError {
    /// 公式转换失败
    #[error("公式转换失败: {source} (片段: {fragment})")]
    MathConversion {
        fragment: String,
        #[source]
        source: MathError,
    },
}

/// 题目存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读写存储文件失败
    #[error("存储文件读写失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 题目序列化失败
    #[error("题目序列化失败 ({id}): {source}")]
    Serialize {
        id: String,
        #[source]
        source: toml::ser::Error,
    },
    /// 存储文件内容无法解析
    #[error("存储文件解析失败 ({path}): {source}")]
    Deserialize {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 题目不存在
    #[error("题目不存在: {id}")]
    NotFound { id: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl ParseError {
    /// 创建公式转换错误
    pub fn math(fragment: impl Into<String>, source: MathError) -> Self {
        ParseError::MathConversion {
            fragment: fragment.into(),
            source,
        }
    }
}

impl StoreError {
    /// 创建存储文件读写错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
