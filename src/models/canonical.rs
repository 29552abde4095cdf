//! 标准答案
//!
//! 教师录入的标准答案，按答案类型区分结构。
//! 旧数据中标准答案有时是纯字符串，有时是结构化对象，两种形态都在反序列化时
//! 统一转换成 [`CanonicalAnswer`]，评分逻辑内部不再区分来源形态。

use serde::{Deserialize, Serialize};

use crate::error::AnswerError;
use crate::models::answer_kind::AnswerKind;
use crate::services::classifier::classify;

/// 标准答案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCanonical", into = "CanonicalRecord")]
pub enum CanonicalAnswer {
    /// 数值答案
    Numeric {
        /// 可解析的数值字符串
        value: String,
        /// 要求的单位
        units: Option<String>,
        /// 允许的绝对误差，未设置时使用自动容差
        tolerance: Option<f64>,
    },
    /// 选择题，选项始终为大写 A-D
    MultipleChoice { letter: String },
    /// 简答题
    ShortText { text: String, synonyms: Vec<String> },
    /// 代数表达式
    Algebraic {
        expression: String,
        synonyms: Vec<String>,
    },
}

impl CanonicalAnswer {
    /// 从教师输入的纯文本创建标准答案
    ///
    /// 使用与评分时相同的分类规则推断类型
    pub fn from_text(text: &str) -> Result<Self, AnswerError> {
        let trimmed = text.trim();
        match classify(trimmed) {
            AnswerKind::Numeric => Ok(CanonicalAnswer::Numeric {
                value: trimmed.to_string(),
                units: None,
                tolerance: None,
            }),
            AnswerKind::MultipleChoice => Ok(CanonicalAnswer::MultipleChoice {
                letter: trimmed.to_uppercase(),
            }),
            AnswerKind::ShortText => Ok(CanonicalAnswer::ShortText {
                text: trimmed.to_string(),
                synonyms: Vec::new(),
            }),
            AnswerKind::Algebraic => Ok(CanonicalAnswer::Algebraic {
                expression: trimmed.to_string(),
                synonyms: Vec::new(),
            }),
            AnswerKind::Unknown => Err(AnswerError::UnknownKind(text.to_string())),
        }
    }

    /// 答案类型
    pub fn kind(&self) -> AnswerKind {
        match self {
            CanonicalAnswer::Numeric { .. } => AnswerKind::Numeric,
            CanonicalAnswer::MultipleChoice { .. } => AnswerKind::MultipleChoice,
            CanonicalAnswer::ShortText { .. } => AnswerKind::ShortText,
            CanonicalAnswer::Algebraic { .. } => AnswerKind::Algebraic,
        }
    }
}

/// 反序列化时接受的两种形态
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCanonical {
    Bare(String),
    Record(CanonicalRecord),
}

/// 结构化存储形态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CanonicalRecord {
    kind: AnswerKind,
    #[serde(
        default,
        deserialize_with = "deserialize_number_string",
        skip_serializing_if = "Option::is_none"
    )]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    synonyms: Vec<String>,
}

impl TryFrom<RawCanonical> for CanonicalAnswer {
    type Error = AnswerError;

    fn try_from(raw: RawCanonical) -> Result<Self, Self::Error> {
        match raw {
            RawCanonical::Bare(text) => CanonicalAnswer::from_text(&text),
            RawCanonical::Record(record) => record.try_into(),
        }
    }
}

impl TryFrom<CanonicalRecord> for CanonicalAnswer {
    type Error = AnswerError;

    fn try_from(record: CanonicalRecord) -> Result<Self, Self::Error> {
        let kind = record.kind;
        match kind {
            AnswerKind::Numeric => {
                let value = required(kind, "value", record.value)?;
                if let Some(tolerance) = record.tolerance {
                    if !tolerance.is_finite() || tolerance < 0.0 {
                        return Err(AnswerError::InvalidTolerance(tolerance));
                    }
                }
                Ok(CanonicalAnswer::Numeric {
                    value,
                    units: record
                        .units
                        .map(|u| u.trim().to_string())
                        .filter(|u| !u.is_empty()),
                    tolerance: record.tolerance,
                })
            }
            AnswerKind::MultipleChoice => {
                let letter = required(kind, "letter", record.letter.or(record.value))?;
                validate_letter(&letter)
                    .map(|letter| CanonicalAnswer::MultipleChoice { letter })
            }
            AnswerKind::ShortText => Ok(CanonicalAnswer::ShortText {
                text: required(kind, "text", record.text.or(record.value))?,
                synonyms: record.synonyms,
            }),
            AnswerKind::Algebraic => Ok(CanonicalAnswer::Algebraic {
                expression: required(kind, "expression", record.expression.or(record.value))?,
                synonyms: record.synonyms,
            }),
            AnswerKind::Unknown => Err(AnswerError::UnknownKind(kind.to_string())),
        }
    }
}

impl From<CanonicalAnswer> for CanonicalRecord {
    fn from(answer: CanonicalAnswer) -> Self {
        let mut record = CanonicalRecord {
            kind: answer.kind(),
            value: None,
            units: None,
            tolerance: None,
            letter: None,
            text: None,
            expression: None,
            synonyms: Vec::new(),
        };
        match answer {
            CanonicalAnswer::Numeric {
                value,
                units,
                tolerance,
            } => {
                record.value = Some(value);
                record.units = units;
                record.tolerance = tolerance;
            }
            CanonicalAnswer::MultipleChoice { letter } => record.letter = Some(letter),
            CanonicalAnswer::ShortText { text, synonyms } => {
                record.text = Some(text);
                record.synonyms = synonyms;
            }
            CanonicalAnswer::Algebraic {
                expression,
                synonyms,
            } => {
                record.expression = Some(expression);
                record.synonyms = synonyms;
            }
        }
        record
    }
}

/// 取出必填字段，去掉首尾空白后不能为空
fn required(
    kind: AnswerKind,
    field: &str,
    value: Option<String>,
) -> Result<String, AnswerError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AnswerError::missing(kind.name(), field))
}

fn validate_letter(letter: &str) -> Result<String, AnswerError> {
    let upper = letter.to_uppercase();
    match upper.as_str() {
        "A" | "B" | "C" | "D" => Ok(upper),
        _ => Err(AnswerError::InvalidLetter(letter.to_string())),
    }
}

/// 数值字段既可能是字符串也可能是数字，统一读成字符串
pub(crate) fn deserialize_number_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct NumberStringVisitor;

    impl<'de> Visitor<'de> for NumberStringVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(NumberStringVisitor)
}
