//! 复核队列写入服务 - 业务能力层
//!
//! 只负责"追加写入复核文件"能力，不关心流程

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 复核队列写入服务
///
/// 职责：
/// - 把需要人工复核的题目追加到复核文件
/// - 把识别服务放弃的题目追加到复核文件，提醒重新作答
pub struct ReviewWriter {
    review_file_path: String,
}

impl ReviewWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            review_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.review_file_path
    }

    /// 写入一条复核记录
    ///
    /// # 参数
    /// - `sheet_name`: 答题卡名称
    /// - `item_id`: 题目编号
    /// - `detail`: 复核原因
    pub async fn write(&self, sheet_name: &str, item_id: &str, detail: &str) -> Result<()> {
        debug!("写入复核记录: 答题卡 {} | 题目 {}", sheet_name, item_id);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.review_file_path)
            .await
            .with_context(|| format!("无法打开复核文件: {}", self.review_file_path))?;

        let line = format!("答题卡 {} | 题目 {} | {}\n", sheet_name, item_id, detail);
        file.write_all(line.as_bytes()).await?;

        Ok(())
    }
}
