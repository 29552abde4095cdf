//! 答案分类器
//!
//! 根据原始文本推断答案类型。教师录入标准答案和学生作答走同一套规则，
//! 两边的分类结果必须一致。
//!
//! 规则按优先级依次判断，命中即返回：
//! 1. 单个字母 A-D（不区分大小写）→ 选择题
//! 2. 整数 / 小数 / 科学计数法，或分母不为 0 的简单分数 → 数值
//! 3. 含拉丁字母、√ ∛ π ∞、`^`、`**`、三角/对数函数名或 `+ - * / ( ) =` → 代数表达式
//! 4. 其他非空文本 → 简答
//! 5. 空文本 → 未知
//!
//! 规则 3 覆盖面很宽，像 "summit" 这样的单词也会被判为代数表达式。
//! 这是现有行为，保持兼容，不在这里修正。

use regex::Regex;
use std::sync::LazyLock;

use crate::models::AnswerKind;
use crate::services::number_parser::parse_fraction;

static MULTIPLE_CHOICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Da-d]$").expect("选择题正则无效"));

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("数值正则无效")
});

static ALGEBRAIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z√∛π∞^]|\*\*|sin|cos|tan|log|ln|[+\-*/()=]").expect("代数正则无效")
});

/// 推断答案类型
pub fn classify(text: &str) -> AnswerKind {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return AnswerKind::Unknown;
    }
    if MULTIPLE_CHOICE.is_match(trimmed) {
        return AnswerKind::MultipleChoice;
    }
    if NUMBER.is_match(trimmed) || parse_fraction(trimmed).is_some() {
        return AnswerKind::Numeric;
    }
    if ALGEBRAIC.is_match(trimmed) {
        return AnswerKind::Algebraic;
    }
    AnswerKind::ShortText
}
