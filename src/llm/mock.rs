//! Mock 网关（用于测试与离线运行，无需 API）
//!
//! 回复来源按优先级：脚本队列 -> 关键词规则 -> 固定回复 -> 回显 prompt。
//! 所有请求都会被记录，便于断言温度、系统提示等参数。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::GatewayError;
use crate::llm::{GenerateRequest, GenerateResponse, ModelGateway, Usage};

pub const MOCK_MODEL: &str = "mock";

#[derive(Debug, Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    rules: Vec<(String, String)>,
    fixed: Option<Result<String, GatewayError>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次都返回同一段文本
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.fixed = Some(Ok(reply.into()));
        self
    }

    /// 每次都失败
    pub fn failing(error: GatewayError) -> Self {
        Self {
            fixed: Some(Err(error)),
            ..Default::default()
        }
    }

    /// prompt 或 system prompt 包含 needle（不区分大小写）时返回 reply
    pub fn with_rule(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into().to_lowercase(), reply.into()));
        self
    }

    /// 依次返回的脚本回复（用完后回退到规则 / 固定回复）
    pub fn with_script<I>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GatewayError>>,
    {
        {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            script.extend(replies);
        }
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn reply_for(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        if let Some(next) = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front() {
            return next;
        }
        let haystack = format!(
            "{}\n{}",
            request.system_prompt.as_deref().unwrap_or(""),
            request.prompt
        )
        .to_lowercase();
        if let Some((_, reply)) = self.rules.iter().find(|(needle, _)| haystack.contains(needle.as_str())) {
            return Ok(reply.clone());
        }
        match &self.fixed {
            Some(fixed) => fixed.clone(),
            None => Ok(format!("Mock response: {}", request.prompt.chars().take(120).collect::<String>())),
        }
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    fn name(&self) -> &str {
        MOCK_MODEL
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GatewayError> {
        let reply = self.reply_for(&request);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        let content = reply?;
        let prompt_tokens = request.prompt.split_whitespace().count() as u64;
        let completion_tokens = content.split_whitespace().count() as u64;
        Ok(GenerateResponse {
            content,
            model: request.model.unwrap_or_else(|| MOCK_MODEL.to_string()),
            usage: Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            metadata: None,
        })
    }
}
