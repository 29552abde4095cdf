//! 确定性评分
//!
//! 按答案类型比较作答与标准答案，纯函数，无 I/O。
//! 代数表达式在这里只做规范化后的字符串比较，是判定器不可用时的兜底。

use crate::models::{
    CanonicalAnswer, GradeResponse, ReasonCode, SubmissionPayload, SubmittedAnswer,
};
use crate::services::normalizer::normalize;
use crate::services::number_parser::parse_number;

/// 自动容差的相对比例
const AUTO_RELATIVE_TOLERANCE: f64 = 0.005;
/// 标准值绝对值小于 1 时的最小容差
const SMALL_VALUE_TOLERANCE: f64 = 0.01;

/// 确定性评分
pub fn grade_deterministic(
    submission: &SubmissionPayload,
    canonical: &CanonicalAnswer,
) -> GradeResponse {
    match (&submission.answer, canonical) {
        (
            SubmittedAnswer::Numeric { value, units },
            CanonicalAnswer::Numeric {
                value: expected,
                units: expected_units,
                tolerance,
            },
        ) => grade_numeric(
            value,
            units.as_deref(),
            expected,
            expected_units.as_deref(),
            *tolerance,
        ),
        (
            SubmittedAnswer::MultipleChoice { letter },
            CanonicalAnswer::MultipleChoice { letter: expected },
        ) => GradeResponse::verdict(
            letter.trim() == expected.trim(),
            ReasonCode::McMatch,
            ReasonCode::McMismatch,
        ),
        (
            SubmittedAnswer::ShortText { text },
            CanonicalAnswer::ShortText {
                text: expected,
                synonyms,
            },
        ) => grade_short_text(text, expected, synonyms),
        (
            SubmittedAnswer::Algebraic { expression },
            CanonicalAnswer::Algebraic {
                expression: expected,
                synonyms,
            },
        ) => grade_algebraic(expression, expected, synonyms),
        // 类型不一致不判错，交给人工
        _ => GradeResponse::review(ReasonCode::TypeMismatch),
    }
}

/// 实际使用的容差：显式容差优先，否则取相对 0.5% 与小数值最小容差中较大者
pub fn effective_tolerance(expected: f64, tolerance: Option<f64>) -> f64 {
    tolerance.unwrap_or_else(|| {
        let magnitude = expected.abs();
        let floor = if magnitude < 1.0 {
            SMALL_VALUE_TOLERANCE
        } else {
            0.0
        };
        (AUTO_RELATIVE_TOLERANCE * magnitude).max(floor)
    })
}

fn grade_numeric(
    value: &str,
    units: Option<&str>,
    expected: &str,
    expected_units: Option<&str>,
    tolerance: Option<f64>,
) -> GradeResponse {
    let (Some(actual), Some(target)) = (parse_number(value), parse_number(expected)) else {
        return GradeResponse::review(ReasonCode::NumParseFail);
    };

    let tolerance = effective_tolerance(target, tolerance);
    let response = GradeResponse::verdict(
        (actual - target).abs() <= tolerance,
        ReasonCode::NumWithinTolerance,
        ReasonCode::NumOutOfTolerance,
    );

    // 单位只记录原因，不改变结论
    match expected_units {
        Some(required) => {
            if units.map(str::trim) == Some(required.trim()) {
                response.with_reason(ReasonCode::UnitsOk)
            } else {
                response.with_reason(ReasonCode::UnitsMissingOrMismatch)
            }
        }
        None => response,
    }
}

/// 作答转小写后与标准答案（同样转小写）比较；同义答案按原样比较
fn grade_short_text(text: &str, expected: &str, synonyms: &[String]) -> GradeResponse {
    let answer = text.trim().to_lowercase();

    if answer == expected.trim().to_lowercase() {
        GradeResponse::pass(ReasonCode::TextMatch)
    } else if synonyms.iter().any(|s| *s == answer) {
        GradeResponse::pass(ReasonCode::TextSynonymMatch)
    } else {
        GradeResponse::fail(ReasonCode::TextMismatch)
    }
}

fn grade_algebraic(expression: &str, expected: &str, synonyms: &[String]) -> GradeResponse {
    let answer = normalize(expression);
    let matched = answer == normalize(expected) || synonyms.iter().any(|s| normalize(s) == answer);

    GradeResponse::verdict(
        matched,
        ReasonCode::ExprNormalizedMatch,
        ReasonCode::ExprNormalizedMismatch,
    )
}
