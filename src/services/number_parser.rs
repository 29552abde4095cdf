//! 数值解析
//!
//! 支持整数、小数、科学计数法和简单分数。解析失败返回 `None`，
//! 由调用方转成需要复核的评分结论，不会 panic。

use regex::Regex;
use std::sync::LazyLock;

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?[0-9]+)/([0-9]+)$").expect("分数正则无效"));

/// 解析数值
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();

    if FRACTION.is_match(trimmed) {
        return parse_fraction(trimmed);
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 解析 `[符号]整数/整数` 形式的分数，分母为 0 时返回 `None`
pub(crate) fn parse_fraction(text: &str) -> Option<f64> {
    let caps = FRACTION.captures(text)?;
    let numerator = caps[1].parse::<f64>().ok().filter(|v| v.is_finite())?;
    let denominator = caps[2].parse::<f64>().ok().filter(|v| v.is_finite())?;

    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_and_decimals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number("+.25"), Some(0.25));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse_number("1.5e-3"), Some(0.0015));
        assert_eq!(parse_number("6.02E23"), Some(6.02e23));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(parse_number("3/4"), Some(0.75));
        assert_eq!(parse_number("-1/8"), Some(-0.125));
        assert_eq!(parse_number("1/0"), None);
    }

    #[test]
    fn test_failures() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1e999"), None);
        assert_eq!(parse_number("1/2/3"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for x in [0.0, -0.0, 1.0, 0.1, -2.5, 1e-7, 123456.789, 6.02e23, f64::MAX, f64::MIN_POSITIVE] {
            let parsed = parse_number(&x.to_string()).unwrap();
            assert!((parsed - x).abs() <= f64::EPSILON * x.abs().max(1.0));
        }
    }
}
