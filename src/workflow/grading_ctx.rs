//! 评分上下文
//!
//! 封装"我正在评哪张答题卡的哪道题"这一信息，只用于日志

use std::fmt::Display;

/// 评分上下文
#[derive(Debug, Clone)]
pub struct GradingCtx {
    /// 答题卡名称
    pub sheet_name: String,

    /// 答题卡序号（仅用于日志显示）
    pub sheet_index: usize,

    /// 题目编号
    pub item_id: String,
}

impl GradingCtx {
    pub fn new(sheet_name: String, sheet_index: usize, item_id: String) -> Self {
        Self {
            sheet_name,
            sheet_index,
            item_id,
        }
    }
}

impl Display for GradingCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[答题卡 #{} {} 题目 {}]",
            self.sheet_index, self.sheet_name, self.item_id
        )
    }
}
