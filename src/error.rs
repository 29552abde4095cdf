use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误（判定器 / 识别服务）
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 答案数据错误（标准答案或学生作答的结构不合法）
    #[error("答案错误: {0}")]
    Answer(#[from] AnswerError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 服务错误
///
/// 判定器和识别服务的唯一失败信号，编排层捕获后降级处理，不会传给调用方
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 响应解析失败
    #[error("无法解析LLM返回的内容 (响应: {response}): {source}")]
    ResponseParseFailed {
        response: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 答案数据错误
#[derive(Debug, Error, PartialEq)]
pub enum AnswerError {
    /// 必填字段缺失或为空
    #[error("{kind} 答案缺少必填字段: {field}")]
    MissingField { kind: String, field: String },
    /// 容差不合法
    #[error("容差必须是非负有限数: {0}")]
    InvalidTolerance(f64),
    /// 选择题选项不合法
    #[error("选择题选项必须是 A-D: {0}")]
    InvalidLetter(String),
    /// 无法确定答案类型
    #[error("无法确定答案类型: {0:?}")]
    UnknownKind(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// 阈值超出 [0, 1]
    #[error("阈值 {name} 必须在 [0, 1] 范围内: {value}")]
    ThresholdOutOfRange { name: String, value: f64 },
    /// 复核阈值高于通过阈值
    #[error("复核阈值 {review} 不能高于通过阈值 {pass}")]
    ThresholdOrder { pass: f64, review: f64 },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

impl LlmError {
    /// 创建 API 调用失败错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建响应解析失败错误
    pub fn parse_failed(
        response: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ResponseParseFailed {
            response: response.into(),
            source: Box::new(source),
        }
    }
}

impl AnswerError {
    pub(crate) fn missing(kind: impl Into<String>, field: impl Into<String>) -> Self {
        AnswerError::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
