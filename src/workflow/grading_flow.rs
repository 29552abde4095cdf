//! 评分流程 - 流程层
//!
//! 核心职责：定义"一道题"的评分流程
//!
//! 流程顺序：
//! 1. 作答类型与标准答案类型不一致 → 复核
//! 2. 非代数题 → 确定性评分
//! 3. 代数题：空作答 → 不通过；否则调用语义判定器并按置信度分档
//! 4. 判定器失败 → 降级为规范化字符串比较（只尝试一次，不重试）

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{Config, GradingConfig};
use crate::error::ConfigError;
use crate::models::{
    CanonicalAnswer, GradeResponse, ReasonCode, SubmissionPayload, SubmittedAnswer,
};
use crate::services::equivalence_oracle::{
    EquivalenceOracle, EquivalenceVerdict, LlmEquivalenceOracle,
};
use crate::services::deterministic_grader::grade_deterministic;

/// 判定器给出"需要复核"时的分数
const REVIEW_SCORE: f64 = 0.5;

/// 评分流程
///
/// - 不持有任何可变状态，可以被多个任务同时使用
/// - 只依赖判定能力的 trait，不关心具体实现
pub struct GradingFlow {
    oracle: Arc<dyn EquivalenceOracle>,
    config: GradingConfig,
}

impl GradingFlow {
    /// 创建新的评分流程
    pub fn new(oracle: Arc<dyn EquivalenceOracle>, config: GradingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { oracle, config })
    }

    /// 使用 LLM 判定器创建
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(Arc::new(LlmEquivalenceOracle::new(config)), config.grading())
    }

    /// 评分入口
    ///
    /// 对所有合法输入都返回结论，判定器故障不会传给调用方
    pub async fn grade_with_llm(
        &self,
        submission: &SubmissionPayload,
        canonical: &CanonicalAnswer,
    ) -> GradeResponse {
        if submission.kind() != canonical.kind() {
            return GradeResponse::review(ReasonCode::TypeMismatch);
        }

        let (
            SubmittedAnswer::Algebraic { expression },
            CanonicalAnswer::Algebraic {
                expression: correct,
                synonyms,
            },
        ) = (&submission.answer, canonical)
        else {
            return grade_deterministic(submission, canonical);
        };

        if expression.trim().is_empty() {
            return GradeResponse::fail(ReasonCode::EmptySubmission);
        }

        if !self.config.use_oracle {
            debug!("未启用判定器，使用规范化比较");
            return grade_deterministic(submission, canonical);
        }

        match self
            .oracle
            .check_equivalence(expression, correct, synonyms)
            .await
        {
            Ok(verdict) => self.apply_thresholds(verdict),
            Err(e) => {
                warn!("⚠️ 判定器调用失败，降级为规范化比较: {}", e);
                grade_deterministic(submission, canonical)
            }
        }
    }

    /// 按置信度分档
    fn apply_thresholds(&self, verdict: EquivalenceVerdict) -> GradeResponse {
        let response = if verdict.is_match
            && verdict.confidence >= self.config.pass_confidence_threshold
        {
            GradeResponse::pass(ReasonCode::OracleEquivalent)
        } else if verdict.is_match && verdict.confidence >= self.config.review_confidence_threshold
        {
            GradeResponse::review(ReasonCode::OracleUncertain).with_score(REVIEW_SCORE)
        } else {
            GradeResponse::fail(ReasonCode::OracleNotEquivalent)
        };

        response.with_explanation(verdict.reason)
    }
}
