//! 代数表达式规范化
//!
//! 把看起来等价的写法变成同一个字符串，供判定器不可用时做精确比较。
//! 这不是解析器，不保证数学上的正确性。
//!
//! 处理顺序固定（后面的步骤依赖前面的结果）：
//! 1. 转小写、去首尾空白
//! 2. 根号和常数符号替换成 ASCII 名称
//! 3. 上标数字替换成 `^` 加数字
//! 4. 乘除号替换成 `*` 和 `/`
//! 5. 给 `sqrt` 补括号
//! 6. 去掉所有空白
//! 7. 插入省略的乘号

use phf::phf_map;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static SUPERSCRIPTS: phf::Map<char, char> = phf_map! {
    '⁰' => '0',
    '¹' => '1',
    '²' => '2',
    '³' => '3',
    '⁴' => '4',
    '⁵' => '5',
    '⁶' => '6',
    '⁷' => '7',
    '⁸' => '8',
    '⁹' => '9',
};

static OPERATOR_GLYPHS: phf::Map<char, char> = phf_map! {
    '×' => '*',
    '·' => '*',
    '•' => '*',
    '÷' => '/',
};

static ROOT_OF_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"√([0-9]+)").expect("正则无效"));
static ROOT_OF_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"√([a-z])").expect("正则无效"));
static SQRT_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"sqrt([0-9]+)").expect("正则无效"));
static SQRT_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sqrt([a-z])").expect("正则无效"));
static DIGIT_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9])([a-z])").expect("正则无效"));
static LETTER_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([0-9])").expect("正则无效"));
static LETTER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").expect("正则无效"));

/// 规范化代数表达式
pub fn normalize(expression: &str) -> String {
    // 1. 小写、去首尾空白
    let s = expression.trim().to_lowercase();

    // 2. 根号和常数
    let s = ROOT_OF_NUMBER.replace_all(&s, "sqrt($1)");
    let s = ROOT_OF_LETTER.replace_all(&s, "sqrt($1)");
    let s = s
        .replace("√(", "sqrt(")
        .replace('√', "sqrt")
        .replace('∛', "cbrt")
        .replace('π', "pi")
        .replace('∞', "infinity");

    // 3 & 4. 上标与乘除号
    let mut replaced = String::with_capacity(s.len());
    for c in s.chars() {
        if let Some(digit) = SUPERSCRIPTS.get(&c) {
            replaced.push('^');
            replaced.push(*digit);
        } else if let Some(op) = OPERATOR_GLYPHS.get(&c) {
            replaced.push(*op);
        } else {
            replaced.push(c);
        }
    }

    // 5. sqrt15 → sqrt(15)，sqrtx → sqrt(x)
    let s = parenthesize_sqrt(&replaced);

    // 6. 去掉空白；去空白后可能出现新的 `sqrt x` 相邻，需要再补一次括号
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let s = parenthesize_sqrt(&s);

    // 7. 隐式乘法
    let s = DIGIT_LETTER.replace_all(&s, "$1*$2");
    let s = LETTER_DIGIT.replace_all(&s, "$1*$2");
    // 只拆恰好两个字母的连续串，sin / sqrt 这类函数名保持原样
    let s = LETTER_RUN.replace_all(&s, |caps: &Captures| {
        let run = &caps[0];
        if run.len() == 2 {
            format!("{}*{}", &run[..1], &run[1..])
        } else {
            run.to_string()
        }
    });

    s.into_owned()
}

fn parenthesize_sqrt(s: &str) -> String {
    let s = SQRT_NUMBER.replace_all(s, "sqrt($1)");
    SQRT_LETTER.replace_all(&s, "sqrt($1)").into_owned()
}
