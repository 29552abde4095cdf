//! 学生作答
//!
//! 每次评分请求从识别结果新建，核心逻辑不持久化

use serde::{Deserialize, Serialize};

use crate::error::AnswerError;
use crate::models::answer_kind::AnswerKind;
use crate::models::canonical::deserialize_number_string;
use crate::services::classifier::classify;

/// 作答来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// 手写识别得到
    ExtractedByVision,
    /// 学生直接输入
    #[default]
    Typed,
    /// 识别失败后学生改为手动输入
    TypedAfterVisionFailure,
}

/// 按类型区分的作答内容，结构与标准答案对应
#[derive(Debug, Clone, PartialEq)]
pub enum SubmittedAnswer {
    Numeric { value: String, units: Option<String> },
    MultipleChoice { letter: String },
    ShortText { text: String },
    Algebraic { expression: String },
}

impl SubmittedAnswer {
    pub fn kind(&self) -> AnswerKind {
        match self {
            SubmittedAnswer::Numeric { .. } => AnswerKind::Numeric,
            SubmittedAnswer::MultipleChoice { .. } => AnswerKind::MultipleChoice,
            SubmittedAnswer::ShortText { .. } => AnswerKind::ShortText,
            SubmittedAnswer::Algebraic { .. } => AnswerKind::Algebraic,
        }
    }
}

/// 学生作答
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSubmission")]
pub struct SubmissionPayload {
    pub answer: SubmittedAnswer,
    pub provenance: Provenance,
    /// 识别置信度，仅作为元数据携带，不参与评分判断
    pub confidence: Option<f64>,
}

impl SubmissionPayload {
    pub fn new(answer: SubmittedAnswer, provenance: Provenance) -> Self {
        Self {
            answer,
            provenance,
            confidence: None,
        }
    }

    /// 从纯文本创建作答，类型由分类器推断
    ///
    /// 空文本返回 `None`
    pub fn from_text(text: &str, provenance: Provenance) -> Option<Self> {
        let kind = classify(text);
        Self::with_kind(kind, text.trim().to_string(), None, provenance)
    }

    /// 从识别结果创建作答，类型使用题目期望的类型
    ///
    /// 期望类型为 `Unknown` 时返回 `None`
    pub fn from_extraction(
        kind: AnswerKind,
        extracted: ExtractedAnswer,
        provenance: Provenance,
    ) -> Option<Self> {
        Self::with_kind(kind, extracted.value, extracted.units, provenance).map(|mut payload| {
            payload.confidence = Some(extracted.confidence);
            payload
        })
    }

    /// 空白作答按题目期望的类型生成空内容，交给评分逻辑给出结论
    fn blank(expected: AnswerKind, provenance: Provenance) -> Option<Self> {
        Self::with_kind(expected, String::new(), None, provenance)
    }

    /// 结合题目期望类型解析作答，空白的纯文本作答不会报错
    pub(crate) fn resolve(raw: RawSubmission, expected: AnswerKind) -> Result<Self, AnswerError> {
        match raw {
            RawSubmission::Bare(text) if text.trim().is_empty() => {
                Self::blank(expected, Provenance::Typed).ok_or(AnswerError::UnknownKind(text))
            }
            raw => Self::try_from(raw),
        }
    }

    fn with_kind(
        kind: AnswerKind,
        value: String,
        units: Option<String>,
        provenance: Provenance,
    ) -> Option<Self> {
        let answer = match kind {
            AnswerKind::Numeric => SubmittedAnswer::Numeric { value, units },
            // 与标准答案录入时一致，选择题字母统一大写
            AnswerKind::MultipleChoice => SubmittedAnswer::MultipleChoice {
                letter: value.trim().to_uppercase(),
            },
            AnswerKind::ShortText => SubmittedAnswer::ShortText { text: value },
            AnswerKind::Algebraic => SubmittedAnswer::Algebraic { expression: value },
            AnswerKind::Unknown => return None,
        };
        Some(Self::new(answer, provenance))
    }

    pub fn kind(&self) -> AnswerKind {
        self.answer.kind()
    }
}

/// 识别服务返回的作答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub confidence: f64,
}

/// 识别结果
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// 识别服务放弃或置信度过低，调用方需要让学生重新作答
    Abstain,
    Extracted(ExtractedAnswer),
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawSubmission {
    Bare(String),
    Record(SubmissionRecord),
}

#[derive(Deserialize)]
pub(crate) struct SubmissionRecord {
    kind: AnswerKind,
    #[serde(default, deserialize_with = "deserialize_number_string")]
    value: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    letter: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    expression: Option<String>,
    #[serde(default)]
    provenance: Provenance,
    #[serde(default)]
    confidence: Option<f64>,
}

impl TryFrom<RawSubmission> for SubmissionPayload {
    type Error = AnswerError;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        match raw {
            RawSubmission::Bare(text) => SubmissionPayload::from_text(&text, Provenance::Typed)
                .ok_or(AnswerError::UnknownKind(text)),
            RawSubmission::Record(record) => {
                let kind = record.kind;
                // 作答内容允许为空（例如空白的代数作答），由评分逻辑给出结论
                let answer = match kind {
                    AnswerKind::Numeric => SubmittedAnswer::Numeric {
                        value: record.value.unwrap_or_default(),
                        units: record
                            .units
                            .map(|u| u.trim().to_string())
                            .filter(|u| !u.is_empty()),
                    },
                    AnswerKind::MultipleChoice => SubmittedAnswer::MultipleChoice {
                        letter: record
                            .letter
                            .or(record.value)
                            .unwrap_or_default()
                            .trim()
                            .to_uppercase(),
                    },
                    AnswerKind::ShortText => SubmittedAnswer::ShortText {
                        text: record.text.or(record.value).unwrap_or_default(),
                    },
                    AnswerKind::Algebraic => SubmittedAnswer::Algebraic {
                        expression: record.expression.or(record.value).unwrap_or_default(),
                    },
                    AnswerKind::Unknown => return Err(AnswerError::UnknownKind(kind.to_string())),
                };
                Ok(SubmissionPayload {
                    answer,
                    provenance: record.provenance,
                    confidence: record.confidence.map(|c| c.clamp(0.0, 1.0)),
                })
            }
        }
    }
}
