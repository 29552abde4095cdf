//! 单张答题卡处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责评完一张答题卡上的所有题目，是答题卡级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **遍历题目**：按顺序处理 `Vec<GradingItem>`
//! 2. **识别作答**：只有图片的题目先经过识别服务，识别放弃的题目跳过
//! 3. **流程调度**：委托 `GradingFlow` 给出结论
//! 4. **复核登记**：REVIEW 结论和识别放弃写入复核文件
//! 5. **统计输出**：记录 PASS / FAIL / REVIEW / 跳过数量

use crate::models::{
    ExtractionOutcome, GradeResult, GradingItem, GradingSheet, Provenance, SubmissionPayload,
};
use crate::services::{AnswerExtractor, ReviewWriter};
use crate::utils::logging::truncate_text;
use crate::workflow::{GradingCtx, GradingFlow};
use tracing::{error, info, warn};

/// 答题卡评分统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SheetStats {
    pub pass: usize,
    pub fail: usize,
    pub review: usize,
    /// 没有可评分作答的题目
    pub skipped: usize,
}

impl SheetStats {
    pub fn record(&mut self, result: GradeResult) {
        match result {
            GradeResult::Pass => self.pass += 1,
            GradeResult::Fail => self.fail += 1,
            GradeResult::Review => self.review += 1,
        }
    }

    pub fn merge(&mut self, other: &SheetStats) {
        self.pass += other.pass;
        self.fail += other.fail;
        self.review += other.review;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.review + self.skipped
    }
}

/// 评完一张答题卡
///
/// # 参数
/// - `flow`: 评分流程
/// - `extractor`: 识别服务
/// - `review_writer`: 复核文件写入
/// - `sheet`: 答题卡数据
/// - `sheet_index`: 答题卡序号（用于日志）
pub async fn process_sheet(
    flow: &GradingFlow,
    extractor: &dyn AnswerExtractor,
    review_writer: &ReviewWriter,
    sheet: &GradingSheet,
    sheet_index: usize,
) -> SheetStats {
    info!(
        "[答题卡 {}] 📄 {} (共 {} 道题)",
        sheet_index,
        sheet.name,
        sheet.items.len()
    );

    let mut stats = SheetStats::default();

    for item in &sheet.items {
        let ctx = GradingCtx::new(sheet.name.clone(), sheet_index, item.id.clone());

        let Some(submission) = resolve_submission(extractor, review_writer, item, &ctx).await
        else {
            stats.skipped += 1;
            continue;
        };

        let response = flow.grade_with_llm(&submission, &item.canonical).await;
        info!("{} {}", ctx, response);
        if let Some(explanation) = &response.explanation {
            info!("{}   说明: {}", ctx, truncate_text(explanation, 80));
        }

        if response.result == GradeResult::Review {
            record_review(review_writer, &ctx, &response.to_string()).await;
        }
        stats.record(response.result);
    }

    info!(
        "[答题卡 {}] ✓ 完成: PASS {} / FAIL {} / REVIEW {} / 跳过 {}",
        sheet_index, stats.pass, stats.fail, stats.review, stats.skipped
    );

    stats
}

/// 取得可评分的作答
///
/// 识别放弃或识别失败时登记复核并返回 `None`
async fn resolve_submission(
    extractor: &dyn AnswerExtractor,
    review_writer: &ReviewWriter,
    item: &GradingItem,
    ctx: &GradingCtx,
) -> Option<SubmissionPayload> {
    if let Some(submission) = &item.submission {
        return Some(submission.clone());
    }

    let Some(image_url) = &item.image_url else {
        warn!("{} ⚠️ 既没有作答也没有图片，跳过", ctx);
        return None;
    };

    let expected = item.canonical.kind();
    match extractor.extract(image_url, expected).await {
        Ok(ExtractionOutcome::Extracted(extracted)) => {
            SubmissionPayload::from_extraction(expected, extracted, Provenance::ExtractedByVision)
        }
        Ok(ExtractionOutcome::Abstain) => {
            warn!("{} ⚠️ 识别放弃，需要学生重新作答", ctx);
            record_review(review_writer, ctx, "识别放弃，需要重新作答").await;
            None
        }
        Err(e) => {
            error!("{} ❌ 识别服务失败: {}", ctx, e);
            record_review(review_writer, ctx, "识别服务失败，需要重新作答").await;
            None
        }
    }
}

/// 登记复核；写入失败只记录错误，已经得到的结论照常统计
async fn record_review(review_writer: &ReviewWriter, ctx: &GradingCtx, detail: &str) {
    if let Err(e) = review_writer
        .write(&ctx.sheet_name, &ctx.item_id, detail)
        .await
    {
        error!("{} ❌ 写入复核文件失败: {:#}", ctx, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingConfig;
    use crate::error::LlmError;
    use crate::models::AnswerKind;
    use crate::services::{EquivalenceOracle, EquivalenceVerdict};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// 总是给出中等置信度的判定器
    struct UnsureOracle;

    #[async_trait]
    impl EquivalenceOracle for UnsureOracle {
        async fn check_equivalence(
            &self,
            _submitted: &str,
            _correct: &str,
            _synonyms: &[String],
        ) -> Result<EquivalenceVerdict, LlmError> {
            Ok(EquivalenceVerdict {
                is_match: true,
                confidence: 0.8,
                reason: String::new(),
            })
        }
    }

    /// 总是放弃的识别服务
    struct AbstainingExtractor;

    #[async_trait]
    impl AnswerExtractor for AbstainingExtractor {
        async fn extract(
            &self,
            _image_url: &str,
            _expected: AnswerKind,
        ) -> Result<ExtractionOutcome, LlmError> {
            Ok(ExtractionOutcome::Abstain)
        }
    }

    fn flow() -> GradingFlow {
        GradingFlow::new(Arc::new(UnsureOracle), GradingConfig::default()).unwrap()
    }

    #[test]
    fn test_blank_answers_still_graded() {
        let sheet: GradingSheet = toml::from_str(
            r#"
name = "空白作答"

[[items]]
id = "q1"
canonical = "42"
submission = "42"

[[items]]
id = "q2"
canonical = "B"
submission = ""

[[items]]
id = "q3"
canonical = { kind = "algebraic", expression = "x + 1" }
submission = "  "

[[items]]
id = "q4"
canonical = "C"
submission = { kind = "mc", letter = "" }
"#,
        )
        .unwrap();
        let review_path = std::env::temp_dir().join(format!(
            "answer_grader_blank_{}.txt",
            std::process::id()
        ));
        let review_writer = ReviewWriter::with_path(review_path.to_string_lossy());

        let stats = tokio_test::block_on(process_sheet(
            &flow(),
            &AbstainingExtractor,
            &review_writer,
            &sheet,
            1,
        ));

        assert_eq!(
            stats,
            SheetStats {
                pass: 1,
                fail: 3,
                review: 0,
                skipped: 0
            }
        );
        let _ = std::fs::remove_file(&review_path);
    }

    #[test]
    fn test_review_write_failure_keeps_grading() {
        let sheet: GradingSheet = toml::from_str(
            r#"
name = "复核文件不可写"

[[items]]
id = "q1"
canonical = { kind = "algebraic", expression = "x^2 + 4x + 4" }
submission = "(x+2)^2"

[[items]]
id = "q2"
canonical = { kind = "numeric", value = "5" }
image_url = "https://example.com/q2.png"

[[items]]
id = "q3"
canonical = "A"
submission = "a"
"#,
        )
        .unwrap();
        // 目录路径无法作为文件追加写入
        let review_writer = ReviewWriter::with_path(std::env::temp_dir().to_string_lossy());

        let stats = tokio_test::block_on(process_sheet(
            &flow(),
            &AbstainingExtractor,
            &review_writer,
            &sheet,
            1,
        ));

        assert_eq!(
            stats,
            SheetStats {
                pass: 1,
                fail: 0,
                review: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_stats_record_and_merge() {
        let mut a = SheetStats::default();
        a.record(GradeResult::Pass);
        a.record(GradeResult::Review);
        a.skipped += 1;

        let mut b = SheetStats::default();
        b.record(GradeResult::Fail);
        b.merge(&a);

        assert_eq!(
            b,
            SheetStats {
                pass: 1,
                fail: 1,
                review: 1,
                skipped: 1
            }
        );
        assert_eq!(b.total(), 4);
    }
}
