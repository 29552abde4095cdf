//! 语义等价判定器 - 业务能力层
//!
//! 判断两个代数表达式在数学上是否等价。编排层只依赖 [`EquivalenceOracle`] trait，
//! 测试中可以换成返回固定结果的实现。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::LlmError;
use crate::services::llm_service::{extract_json_object, LlmService};

/// 判定结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceVerdict {
    #[serde(rename = "match")]
    pub is_match: bool,
    /// [0, 1]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

impl EquivalenceVerdict {
    fn exact(reason: &str) -> Self {
        Self {
            is_match: true,
            confidence: 1.0,
            reason: reason.to_string(),
        }
    }
}

/// 语义等价判定能力
#[async_trait]
pub trait EquivalenceOracle: Send + Sync {
    /// 判断作答表达式是否与标准表达式（或任一同义表达式）等价
    ///
    /// 网络或服务故障返回 `Err`，由调用方决定如何降级
    async fn check_equivalence(
        &self,
        submitted: &str,
        correct: &str,
        synonyms: &[String],
    ) -> Result<EquivalenceVerdict, LlmError>;
}

/// 字符串完全一致（去首尾空白）时直接判定等价，不调用外部服务
pub fn exact_match(submitted: &str, correct: &str, synonyms: &[String]) -> Option<EquivalenceVerdict> {
    let submitted = submitted.trim();

    if submitted == correct.trim() {
        return Some(EquivalenceVerdict::exact("与标准答案完全一致"));
    }
    if synonyms.iter().any(|s| s.trim() == submitted) {
        return Some(EquivalenceVerdict::exact("与同义答案完全一致"));
    }
    None
}

const SYSTEM_MESSAGE: &str = "你是一名严谨的数学老师，负责判断学生写出的代数表达式与标准答案在数学上是否等价。\
只依据数学等价性判断，忽略书写格式差异（空格、乘号省略、上标写法、括号冗余等）。\
只返回 JSON，不要返回任何其他内容。";

/// 基于 LLM 的判定器
pub struct LlmEquivalenceOracle {
    llm_service: LlmService,
}

impl LlmEquivalenceOracle {
    pub fn new(config: &Config) -> Self {
        Self {
            llm_service: LlmService::new(config),
        }
    }

    fn build_prompt(&self, submitted: &str, correct: &str, synonyms: &[String]) -> String {
        let synonym_info = if synonyms.is_empty() {
            "无".to_string()
        } else {
            synonyms
                .iter()
                .enumerate()
                .map(|(i, s)| format!("    {}. {}", i + 1, s))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"请判断学生作答是否与标准答案或任一同义答案在数学上等价。

标准答案：{}
同义答案：
{}
学生作答：{}

【判断要求】
1. 化简或展开后相同即视为等价，例如 x^2+4x+4 与 (x+2)^2
2. 只有在特定取值下才相等的不算等价
3. 无法确定时降低 confidence，不要猜测

按如下格式返回 JSON：
{{"match": true 或 false, "confidence": 0 到 1 之间的小数, "reason": "一句话说明"}}"#,
            correct, synonym_info, submitted
        )
    }
}

#[async_trait]
impl EquivalenceOracle for LlmEquivalenceOracle {
    async fn check_equivalence(
        &self,
        submitted: &str,
        correct: &str,
        synonyms: &[String],
    ) -> Result<EquivalenceVerdict, LlmError> {
        if let Some(verdict) = exact_match(submitted, correct, synonyms) {
            debug!("表达式完全一致，跳过 LLM 判定");
            return Ok(verdict);
        }

        info!("🤖 正在使用LLM判断表达式等价性...");
        let prompt = self.build_prompt(submitted, correct, synonyms);
        let response = self
            .llm_service
            .send_to_llm(&prompt, Some(SYSTEM_MESSAGE), None)
            .await?;

        let verdict = parse_verdict(&response)?;
        debug!(
            "LLM 判定结果: match={}, confidence={:.2}, reason={}",
            verdict.is_match, verdict.confidence, verdict.reason
        );
        Ok(verdict)
    }
}

/// 解析判定器回复
pub(crate) fn parse_verdict(response: &str) -> Result<EquivalenceVerdict, LlmError> {
    let json = extract_json_object(response).unwrap_or(response);
    let mut verdict: EquivalenceVerdict =
        serde_json::from_str(json).map_err(|e| LlmError::parse_failed(response, e))?;

    verdict.confidence = if verdict.confidence.is_finite() {
        verdict.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok(verdict)
}
