//! 批量评分处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量答题卡的评分和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、创建评分流程、识别服务和复核写入器
//! 2. **批量加载**：扫描并加载所有答题卡（`Vec<GradingSheet>`）
//! 3. **并发控制**：使用 Semaphore 限制同时评分的答题卡数量
//! 4. **全局统计**：汇总所有答题卡的评分结果
//!
//! 同一张答题卡内的题目按顺序评分，不同答题卡之间没有共享的可变状态。

use crate::config::Config;
use crate::models::GradingSheet;
use crate::orchestrator::sheet_processor::{self, SheetStats};
use crate::services::{AnswerExtractor, LlmExtractionService, ReviewWriter};
use crate::utils::logging::{
    append_log_line, init_log_file, log_batch_complete, log_sheets_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::GradingFlow;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
    extractor: Arc<dyn AnswerExtractor>,
    review_writer: Arc<ReviewWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(config.max_concurrent_sheets, config.use_oracle);

        if config.use_oracle && config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，判定器调用将失败并降级为规范化比较");
        }

        let flow = GradingFlow::from_config(&config).context("评分配置无效")?;

        Ok(Self::with_parts(
            config.clone(),
            Arc::new(flow),
            Arc::new(LlmExtractionService::new(&config)),
            Arc::new(ReviewWriter::with_path(config.review_file.clone())),
        ))
    }

    /// 使用指定的组件创建（测试中可以替换判定器和识别服务）
    pub fn with_parts(
        config: Config,
        flow: Arc<GradingFlow>,
        extractor: Arc<dyn AnswerExtractor>,
        review_writer: Arc<ReviewWriter>,
    ) -> Self {
        Self {
            config,
            flow,
            extractor,
            review_writer,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<SheetStats> {
        info!("\n📁 正在扫描待评分的答题卡...");
        let sheets = crate::models::load_all_toml_files(&self.config.toml_folder).await?;

        if sheets.is_empty() {
            warn!("⚠️ 没有找到待评分的TOML文件，程序结束");
            return Ok(SheetStats::default());
        }

        log_sheets_loaded(sheets.len(), self.config.max_concurrent_sheets);

        let stats = self.process_all_sheets(sheets).await?;

        print_final_stats(&stats, &self.config.output_log_file, self.review_writer.path());

        Ok(stats)
    }

    /// 并发评分所有答题卡
    pub async fn process_all_sheets(&self, sheets: Vec<GradingSheet>) -> Result<SheetStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sheets.max(1)));
        let mut handles = Vec::with_capacity(sheets.len());

        for (idx, sheet) in sheets.into_iter().enumerate() {
            let sheet_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let extractor = self.extractor.clone();
            let review_writer = self.review_writer.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let stats = sheet_processor::process_sheet(
                    &flow,
                    extractor.as_ref(),
                    &review_writer,
                    &sheet,
                    sheet_index,
                )
                .await;
                (sheet_index, sheet.name, stats)
            });
            handles.push(handle);
        }

        let mut stats = SheetStats::default();
        let mut failed_sheets = 0;

        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok((sheet_index, name, sheet_stats)) => {
                    log_batch_complete(sheet_index, &name, &sheet_stats);
                    append_log_line(
                        &self.config.output_log_file,
                        &format!(
                            "{} | PASS {} | FAIL {} | REVIEW {} | 跳过 {}",
                            name,
                            sheet_stats.pass,
                            sheet_stats.fail,
                            sheet_stats.review,
                            sheet_stats.skipped
                        ),
                    )?;
                    stats.merge(&sheet_stats);
                }
                Err(e) => {
                    error!("答题卡任务执行失败: {}", e);
                    failed_sheets += 1;
                }
            }
        }

        if failed_sheets > 0 {
            warn!("⚠️ {} 张答题卡未能完成评分", failed_sheets);
        }

        Ok(stats)
    }
}
