//! AI 生成服务 - 业务能力层
//!
//! 只负责"根据文件名生成标题/描述"能力，不关心流程。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用 OpenAI 兼容接口（Ollama 的 /v1 端点）
//! - 生成失败时回退到固定文案，调用方永远能拿到一个字符串

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Config;

/// AI 生成服务
///
/// 职责：
/// - 调用模型生成视频标题/描述
/// - 清理思考模型输出中的 `<think>` 标签
/// - 不出现 VideoRecord / 批次概念
pub struct AiService {
    client: Client<OpenAIConfig>,
    model_name: String,
    http: reqwest::Client,
    ollama_url: String,
    think_regex: Regex,
}

impl AiService {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.ai_api_key)
            .with_api_base(&config.ai_api_base_url);
        Self {
            client: Client::with_config(openai_config),
            model_name: config.ai_model_name.clone(),
            http: reqwest::Client::new(),
            ollama_url: config.ollama_url.clone(),
            think_regex: Regex::new(r"(?s)<think>.*?</think>").expect("think 正则应当合法"),
        }
    }

    /// 探测 Ollama 服务是否可用
    pub async fn check_service(&self) -> bool {
        let url = format!("{}/api/tags", self.ollama_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("连接 Ollama 失败: {}", e);
                false
            }
        }
    }

    /// 根据文件名生成视频标题，失败时回退到固定文案
    pub async fn generate_title(&self, filename: &str) -> String {
        let prompt = format!(
            "请用中文生成一个吸引人的视频标题，不要思考，直接输出。\n\n\
             视频文件名：{}\n\
             要求：\n\
             1. 必须使用中文\n\
             2. 标题要简洁明了，不超过20个字\n\
             3. 要有吸引力，适合在短视频平台发布\n\
             4. 不要包含特殊符号或emoji\n\
             5. 直接输出标题，不要其他内容\n\n\
             中文标题：",
            filename
        );
        match self.generate_text(&prompt, 50).await {
            Ok(text) => strip_quotes(&text).to_string(),
            Err(e) => {
                warn!("AI 生成标题失败: {}", e);
                format!("AI生成标题_{}", filename)
            }
        }
    }

    /// 根据文件名生成视频描述，失败时回退到固定文案
    pub async fn generate_description(&self, filename: &str) -> String {
        let prompt = format!(
            "请用中文生成一个吸引人的视频描述，不要思考，直接输出。\n\n\
             视频文件名：{}\n\
             要求：\n\
             1. 必须使用中文\n\
             2. 描述要简洁有趣，不超过100字\n\
             3. 要有吸引力，适合在短视频平台发布\n\
             4. 直接输出描述，不要其他内容\n\n\
             中文描述：",
            filename
        );
        match self.generate_text(&prompt, 150).await {
            Ok(text) => text,
            Err(e) => {
                warn!("AI 生成描述失败: {}", e);
                format!("这是一个关于{}的精彩视频，内容有趣，值得观看。", filename)
            }
        }
    }

    /// 通用的文本生成调用
    async fn generate_text(&self, prompt: &str, max_tokens: u32) -> anyhow::Result<String> {
        debug!("调用模型 {} 生成文本", self.model_name);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.3)
            .max_tokens(max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("模型返回内容为空"))?;

        Ok(self.clean_think_tags(&content))
    }

    /// 清理思考模型输出中的 `<think>...</think>` 片段
    fn clean_think_tags(&self, text: &str) -> String {
        let cleaned = self.think_regex.replace_all(text, "");
        cleaned
            .replace("<think>", "")
            .replace("</think>", "")
            .trim()
            .to_string()
    }
}

/// 去掉模型偶尔带上的成对引号
fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if text.len() >= 2 && text.starts_with(open) && text.ends_with(close) {
            return &text[open.len_utf8()..text.len() - close.len_utf8()];
        }
    }
    text
}
