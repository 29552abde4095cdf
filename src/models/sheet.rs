use serde::Deserialize;

use crate::error::AnswerError;
use crate::models::canonical::CanonicalAnswer;
use crate::models::submission::{RawSubmission, SubmissionPayload};

/// 一份待评分的答题卡（对应一个 TOML 文件）
#[derive(Debug, Clone, Deserialize)]
pub struct GradingSheet {
    pub name: String,
    #[serde(default)]
    pub items: Vec<GradingItem>,
    #[serde(skip_deserializing)]
    pub file_path: Option<String>,
}

/// 答题卡中的一道题
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawItem")]
pub struct GradingItem {
    pub id: String,
    pub canonical: CanonicalAnswer,
    /// 已经得到的作答
    pub submission: Option<SubmissionPayload>,
    /// 需要先经过识别服务的手写作答图片
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
struct RawItem {
    id: String,
    canonical: CanonicalAnswer,
    #[serde(default)]
    submission: Option<RawSubmission>,
    #[serde(default)]
    image_url: Option<String>,
}

impl TryFrom<RawItem> for GradingItem {
    type Error = AnswerError;

    /// 空白作答按标准答案的类型解析，保证整张答题卡仍然可以评分
    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let expected = raw.canonical.kind();
        let submission = raw
            .submission
            .map(|submission| SubmissionPayload::resolve(submission, expected))
            .transpose()?;

        Ok(GradingItem {
            id: raw.id,
            canonical: raw.canonical,
            submission,
            image_url: raw.image_url,
        })
    }
}

impl GradingSheet {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
