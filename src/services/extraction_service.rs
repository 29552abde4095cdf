//! 作答识别服务 - 业务能力层
//!
//! 把手写作答图片转换成作答值。识别本身交给外部视觉模型，
//! 这里只负责请求、解析和置信度门限：低于门限一律视为放弃，评分核心看不到这类结果。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::models::{AnswerKind, ExtractedAnswer, ExtractionOutcome};
use crate::services::llm_service::{extract_json_object, LlmService};

/// 作答识别能力
#[async_trait]
pub trait AnswerExtractor: Send + Sync {
    /// 识别手写作答图片，`expected` 是题目期望的答案类型
    async fn extract(
        &self,
        image_url: &str,
        expected: AnswerKind,
    ) -> Result<ExtractionOutcome, LlmError>;
}

/// 模型回复格式
#[derive(Debug, Deserialize)]
struct ExtractionReply {
    #[serde(default)]
    abstain: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    confidence: f64,
}

const SYSTEM_MESSAGE: &str = "你是一个手写作答识别助手，负责从学生作答图片中读出最终答案。\
看不清或没有作答时必须放弃，不要猜测。只返回 JSON，不要返回任何其他内容。";

/// 基于视觉模型的识别服务
pub struct LlmExtractionService {
    llm_service: LlmService,
    min_confidence: f64,
}

impl LlmExtractionService {
    pub fn new(config: &Config) -> Self {
        Self {
            llm_service: LlmService::new(config),
            min_confidence: config.extraction_min_confidence,
        }
    }

    fn build_prompt(&self, expected: AnswerKind) -> String {
        let hint = match expected {
            AnswerKind::Numeric => "一个数值，如果写了单位请单独放在 units 中",
            AnswerKind::MultipleChoice => "一个选项字母（A、B、C 或 D）",
            AnswerKind::ShortText => "一个简短的词语或短句",
            AnswerKind::Algebraic => "一个代数表达式，使用 ^ 表示乘方，sqrt() 表示根号",
            AnswerKind::Unknown => "学生写下的最终答案",
        };

        format!(
            r#"请读出图片中学生的最终答案。

期望的答案形式：{}

按如下格式返回 JSON：
{{"abstain": 是否放弃, "value": "答案文本", "units": "单位或 null", "confidence": 0 到 1 之间的小数}}"#,
            hint
        )
    }
}

#[async_trait]
impl AnswerExtractor for LlmExtractionService {
    async fn extract(
        &self,
        image_url: &str,
        expected: AnswerKind,
    ) -> Result<ExtractionOutcome, LlmError> {
        info!("🔍 正在识别手写作答...");
        let prompt = self.build_prompt(expected);
        let images = [image_url.to_string()];
        let response = self
            .llm_service
            .send_to_llm(&prompt, Some(SYSTEM_MESSAGE), Some(&images))
            .await?;

        let outcome = parse_extraction(&response, self.min_confidence)?;
        match &outcome {
            ExtractionOutcome::Abstain => warn!("识别服务放弃或置信度不足: {}", image_url),
            ExtractionOutcome::Extracted(answer) => debug!(
                "识别结果: {} (置信度 {:.2})",
                answer.value, answer.confidence
            ),
        }
        Ok(outcome)
    }
}

/// 解析识别回复并应用置信度门限
pub(crate) fn parse_extraction(
    response: &str,
    min_confidence: f64,
) -> Result<ExtractionOutcome, LlmError> {
    let json = extract_json_object(response).unwrap_or(response);
    let reply: ExtractionReply =
        serde_json::from_str(json).map_err(|e| LlmError::parse_failed(response, e))?;

    let value = reply
        .value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let confidence = reply.confidence.clamp(0.0, 1.0);

    match value {
        Some(value) if !reply.abstain && confidence >= min_confidence => {
            Ok(ExtractionOutcome::Extracted(ExtractedAnswer {
                value,
                units: reply
                    .units
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty()),
                confidence,
            }))
        }
        _ => Ok(ExtractionOutcome::Abstain),
    }
}
