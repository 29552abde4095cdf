//! # Answer Grader
//!
//! 学生作答自动评分核心：数值、选择题、简答和代数表达式
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 标准答案、作答、评分结论和答题卡
//! - 旧数据既可以是裸字符串，也可以是带 `kind` 的结构化记录，只在边界处转换
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个作答
//! - `classify` / `parse_number` / `normalize` - 纯函数能力
//! - `grade_deterministic` - 不依赖任何外部服务的确定性评分
//! - `EquivalenceOracle` - 代数表达式语义等价判定（LLM 实现）
//! - `AnswerExtractor` - 手写作答识别（只在边界使用）
//! - `ReviewWriter` - 写复核文件能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的评分流程
//! - `GradingCtx` - 上下文封装（答题卡 + 题目编号）
//! - `GradingFlow` - 流程编排（类型检查 → 确定性评分 / 判定器 → 阈值分档 → 降级）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量答题卡处理器，管理资源和并发
//! - `orchestrator/sheet_processor` - 单张答题卡处理器，遍历题目列表
//!
//! ## 模块结构

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, GradingConfig};
pub use error::{AnswerError, AppError, AppResult, ConfigError, LlmError};
pub use models::{
    AnswerKind, CanonicalAnswer, GradeResponse, GradeResult, GradingItem, GradingSheet,
    Provenance, ReasonCode, SubmissionPayload, SubmittedAnswer,
};
pub use orchestrator::{process_sheet, App, SheetStats};
pub use services::{
    classify, grade_deterministic, normalize, parse_number, EquivalenceOracle,
    EquivalenceVerdict,
};
pub use workflow::{GradingCtx, GradingFlow};
