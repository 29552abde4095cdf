use serde::{Deserialize, Serialize};
use std::fmt;

/// 评分结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradeResult {
    Pass,
    Fail,
    /// 需要人工复核，是正常的终态而不是错误
    Review,
}

impl fmt::Display for GradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeResult::Pass => write!(f, "PASS"),
            GradeResult::Fail => write!(f, "FAIL"),
            GradeResult::Review => write!(f, "REVIEW"),
        }
    }
}

/// 机器可读的评分原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// 作答类型与标准答案类型不一致
    TypeMismatch,
    /// 数值无法解析
    NumParseFail,
    /// 数值在容差范围内
    NumWithinTolerance,
    /// 数值超出容差
    NumOutOfTolerance,
    UnitsOk,
    UnitsMissingOrMismatch,
    McMatch,
    McMismatch,
    /// 与标准答案一致（不区分大小写）
    TextMatch,
    /// 与某个同义答案一致
    TextSynonymMatch,
    TextMismatch,
    /// 规范化后的表达式一致
    ExprNormalizedMatch,
    ExprNormalizedMismatch,
    EmptySubmission,
    /// 判定器高置信度认为等价
    OracleEquivalent,
    /// 判定器认为等价但置信度不足，需要人工确认
    OracleUncertain,
    /// 判定器认为不等价，或置信度过低
    OracleNotEquivalent,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::TypeMismatch => "TYPE_MISMATCH",
            ReasonCode::NumParseFail => "NUM_PARSE_FAIL",
            ReasonCode::NumWithinTolerance => "NUM_WITHIN_TOLERANCE",
            ReasonCode::NumOutOfTolerance => "NUM_OUT_OF_TOLERANCE",
            ReasonCode::UnitsOk => "UNITS_OK",
            ReasonCode::UnitsMissingOrMismatch => "UNITS_MISSING_OR_MISMATCH",
            ReasonCode::McMatch => "MC_MATCH",
            ReasonCode::McMismatch => "MC_MISMATCH",
            ReasonCode::TextMatch => "TEXT_MATCH",
            ReasonCode::TextSynonymMatch => "TEXT_SYNONYM_MATCH",
            ReasonCode::TextMismatch => "TEXT_MISMATCH",
            ReasonCode::ExprNormalizedMatch => "EXPR_NORMALIZED_MATCH",
            ReasonCode::ExprNormalizedMismatch => "EXPR_NORMALIZED_MISMATCH",
            ReasonCode::EmptySubmission => "EMPTY_SUBMISSION",
            ReasonCode::OracleEquivalent => "ORACLE_EQUIVALENT",
            ReasonCode::OracleUncertain => "ORACLE_UNCERTAIN",
            ReasonCode::OracleNotEquivalent => "ORACLE_NOT_EQUIVALENT",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResponse {
    pub result: GradeResult,
    /// [0, 1]
    pub score: f64,
    pub reasons: Vec<ReasonCode>,
    /// 判定器给出的说明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl GradeResponse {
    pub fn pass(reason: ReasonCode) -> Self {
        Self::new(GradeResult::Pass, 1.0, reason)
    }

    pub fn fail(reason: ReasonCode) -> Self {
        Self::new(GradeResult::Fail, 0.0, reason)
    }

    pub fn review(reason: ReasonCode) -> Self {
        Self::new(GradeResult::Review, 0.0, reason)
    }

    /// 通过或不通过
    pub fn verdict(passed: bool, pass_reason: ReasonCode, fail_reason: ReasonCode) -> Self {
        if passed {
            Self::pass(pass_reason)
        } else {
            Self::fail(fail_reason)
        }
    }

    fn new(result: GradeResult, score: f64, reason: ReasonCode) -> Self {
        Self {
            result,
            score,
            reasons: vec![reason],
            explanation: None,
        }
    }

    pub fn with_reason(mut self, reason: ReasonCode) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

impl fmt::Display for GradeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<&str> = self.reasons.iter().map(|r| r.as_str()).collect();
        write!(f, "{} ({:.1}) [{}]", self.result, self.score, reasons.join(", "))
    }
}
