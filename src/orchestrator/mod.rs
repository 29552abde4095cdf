//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量评分和调度，不做具体的评分判断。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<GradingSheet>)
//!     ↓
//! sheet_processor (处理 Vec<GradingItem>)
//!     ↓
//! workflow::GradingFlow (处理单个作答)
//!     ↓
//! services (能力层：分类 / 解析 / 规范化 / 确定性评分 / 判定器 / 识别)
//! ```

pub mod batch_processor;
pub mod sheet_processor;

pub use batch_processor::App;
pub use sheet_processor::{process_sheet, SheetStats};
