use serde::{Deserialize, Serialize};
use std::fmt;

/// 答案类型
///
/// 决定标准答案的结构和使用哪种比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// 数值题
    Numeric,
    /// 选择题（A-D）
    #[serde(alias = "mc")]
    MultipleChoice,
    /// 简答题
    #[serde(alias = "short", alias = "text")]
    ShortText,
    /// 代数表达式
    #[serde(alias = "algebra", alias = "expression")]
    Algebraic,
    /// 无法识别（空输入）
    Unknown,
}

impl AnswerKind {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            AnswerKind::Numeric => "numeric",
            AnswerKind::MultipleChoice => "multiple_choice",
            AnswerKind::ShortText => "short_text",
            AnswerKind::Algebraic => "algebraic",
            AnswerKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
