use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时评分的答题卡数量
    pub max_concurrent_sheets: usize,
    /// TOML 答题卡存放目录
    pub toml_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 复核队列文件
    pub review_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 评分配置 ---
    pub use_oracle: bool,
    pub pass_confidence_threshold: f64,
    pub review_confidence_threshold: f64,
    /// 识别置信度低于该值视为放弃
    pub extraction_min_confidence: f64,
}

impl Default for Config {
    fn default() -> Self {
        let grading = GradingConfig::default();
        Self {
            max_concurrent_sheets: 4,
            toml_folder: "grading_toml".to_string(),
            verbose_logging: false,
            output_log_file: "grading_log.txt".to_string(),
            review_file: "review.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            use_oracle: grading.use_oracle,
            pass_confidence_threshold: grading.pass_confidence_threshold,
            review_confidence_threshold: grading.review_confidence_threshold,
            extraction_min_confidence: 0.6,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_sheets: env_parse("MAX_CONCURRENT_SHEETS")
                .filter(|n| *n > 0)
                .unwrap_or(default.max_concurrent_sheets),
            toml_folder: std::env::var("TOML_FOLDER").unwrap_or(default.toml_folder),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            review_file: std::env::var("REVIEW_FILE").unwrap_or(default.review_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            use_oracle: env_parse("USE_ORACLE").unwrap_or(default.use_oracle),
            pass_confidence_threshold: env_parse("PASS_CONFIDENCE_THRESHOLD")
                .unwrap_or(default.pass_confidence_threshold),
            review_confidence_threshold: env_parse("REVIEW_CONFIDENCE_THRESHOLD")
                .unwrap_or(default.review_confidence_threshold),
            extraction_min_confidence: env_parse("EXTRACTION_MIN_CONFIDENCE")
                .unwrap_or(default.extraction_min_confidence),
        }
    }

    /// 评分编排使用的配置
    pub fn grading(&self) -> GradingConfig {
        GradingConfig {
            use_oracle: self.use_oracle,
            pass_confidence_threshold: self.pass_confidence_threshold,
            review_confidence_threshold: self.review_confidence_threshold,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// 评分编排配置
///
/// 通过构造函数显式传入编排层，不在评分过程中读取环境变量
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradingConfig {
    /// 代数题是否调用语义判定器
    pub use_oracle: bool,
    /// 判定器置信度不低于该值且等价时通过
    pub pass_confidence_threshold: f64,
    /// 判定器置信度不低于该值且等价时转人工复核
    pub review_confidence_threshold: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            use_oracle: true,
            pass_confidence_threshold: 0.9,
            review_confidence_threshold: 0.7,
        }
    }
}

impl GradingConfig {
    /// 校验阈值范围与先后关系
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("pass_confidence_threshold", self.pass_confidence_threshold),
            ("review_confidence_threshold", self.review_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if self.review_confidence_threshold > self.pass_confidence_threshold {
            return Err(ConfigError::ThresholdOrder {
                pass: self.pass_confidence_threshold,
                review: self.review_confidence_threshold,
            });
        }
        Ok(())
    }
}
