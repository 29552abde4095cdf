//! LLM 服务 - 业务能力层
//!
//! 只负责"调用聊天模型"能力，判定器和识别服务都建立在它之上
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// LLM 服务
///
/// 职责：
/// - 发送一次聊天请求并返回文本
/// - 不解析业务含义，不做重试
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL 列表（可选），会追加到用户消息中
    ///
    /// # 返回
    /// 返回去掉首尾空白的响应内容
    ///
    /// # 示例
    /// ```no_run
    /// # use answer_grader::services::LlmService;
    /// # async fn example(service: &LlmService) -> Result<(), answer_grader::error::LlmError> {
    /// let response = service.send_to_llm(
    ///     "x^2+2x+1 和 (x+1)^2 等价吗？",
    ///     Some("你是一个数学老师"),
    ///     None
    /// ).await?;
    /// println!("LLM 响应: {}", response);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
    ) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let build_failed = |e: OpenAIError| LlmError::api_call_failed(&self.model_name, e);

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(build_failed)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 有图片时使用 Vision 消息：文本 + 图片
        let user_msg = match imgs.filter(|urls| !urls.is_empty()) {
            Some(img_urls) => {
                debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

                let mut content_parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                )];
                for url in img_urls {
                    content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::High),
                            },
                        },
                    ));
                }

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(build_failed)?
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(build_failed)?,
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(512u32)
            .build()
            .map_err(build_failed)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.to_string())
    }
}

/// 从模型回复中取出 JSON 对象
///
/// 模型有时会用 ```json 代码块包裹，或在前后附带说明文字，取最外层的 `{...}`
pub(crate) fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}
