//! OpenAI 兼容 API 网关
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；支持 DeepSeek、OpenAI、自建代理等。
//! 构造时要求提供 API Key，缺失即配置错误。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::core::GatewayError;
use crate::llm::{GenerateRequest, GenerateResponse, ModelGateway, Usage};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容网关：持有 Client、默认 model 与请求超时
pub struct OpenAiGateway {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

/// 解析 API Key：显式参数优先，其次环境变量 OPENAI_API_KEY；空串视为缺失
pub(crate) fn resolve_api_key(api_key: Option<&str>, env_var: &str) -> Result<String, GatewayError> {
    api_key
        .map(String::from)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| GatewayError::MissingCredentials(format!("{} is not set", env_var)))
}

impl OpenAiGateway {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, GatewayError> {
        let api_key = resolve_api_key(api_key, "OPENAI_API_KEY")?;

        let config = if let Some(url) = base_url {
            OpenAIConfig::new()
                .with_api_base(url)
                .with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Ok(Self {
            client: Client::with_config(config),
            model: model.to_string(),
            timeout: Duration::from_secs(timeout_secs.max(1)),
            usage: TokenUsage::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_openai_messages(
        &self,
        request: &GenerateRequest,
    ) -> Result<Vec<ChatCompletionRequestMessage>, GatewayError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.clone())
                    .build()
                    .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?,
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.clone())
                .build()
                .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?,
        ));
        Ok(messages)
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    fn name(&self) -> &str {
        "openai"
    }

    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GatewayError> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&model).messages(self.to_openai_messages(&request)?);
        if let Some(t) = request.temperature {
            builder.temperature(t);
        }
        if let Some(max) = request.max_tokens {
            builder.max_completion_tokens(max);
        }
        let api_request = builder
            .build()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(api_request))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| GatewayError::Provider(e.to_string()))?;

        let usage = response.usage.as_ref().map(|u| {
            let usage = Usage {
                prompt_tokens: u.prompt_tokens as u64,
                completion_tokens: u.completion_tokens as u64,
                total_tokens: u.total_tokens as u64,
            };
            self.usage.add(usage.prompt_tokens, usage.completion_tokens);
            usage
        });

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(GenerateResponse {
            content,
            model: response.model,
            usage,
            metadata: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let err = resolve_api_key(Some("  "), "HIVE_TEST_UNSET_KEY").unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredentials(_)));
        assert!(resolve_api_key(None, "HIVE_TEST_UNSET_KEY").is_err());
    }

    #[test]
    fn test_explicit_key_builds_gateway() {
        let gw = OpenAiGateway::new(Some("http://localhost:1"), "gpt-4o-mini", Some("sk-test"), 5).unwrap();
        assert_eq!(gw.model(), "gpt-4o-mini");
        assert_eq!(gw.name(), "openai");
        assert_eq!(gw.token_usage(), (0, 0, 0));
    }

    #[test]
    fn test_token_usage_accumulates() {
        let usage = TokenUsage::new();
        usage.add(10, 5);
        usage.add(1, 2);
        assert_eq!(usage.get(), (11, 7, 18));
    }
}
