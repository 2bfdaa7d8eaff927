//! LLM 层：Model Provider Gateway 抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

pub mod deepseek;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::GatewayError;

pub use deepseek::{create_deepseek_gateway, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use mock::MockGateway;
pub use openai::{OpenAiGateway, TokenUsage};
pub use traits::{GenerateRequest, GenerateResponse, ModelGateway, Usage};

/// 按配置创建网关：provider 为 deepseek / openai / mock；真实后端缺少凭证时返回错误
pub fn create_gateway_from_config(cfg: &AppConfig) -> Result<Arc<dyn ModelGateway>, GatewayError> {
    let provider = cfg.llm.provider.to_lowercase();
    let timeout = cfg.llm.timeouts.request;
    match provider.as_str() {
        "deepseek" => {
            let model = cfg.llm.model.as_deref();
            let gw = create_deepseek_gateway(model, None, timeout)?;
            tracing::info!("Using DeepSeek gateway ({})", gw.model());
            Ok(Arc::new(gw))
        }
        "openai" => {
            let model = cfg.llm.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
            let gw = OpenAiGateway::new(cfg.llm.base_url.as_deref(), &model, None, timeout)?;
            tracing::info!("Using OpenAI gateway ({})", model);
            Ok(Arc::new(gw))
        }
        "mock" => {
            tracing::warn!("Using Mock gateway, replies are synthetic");
            Ok(Arc::new(MockGateway::new()))
        }
        other => Err(GatewayError::InvalidRequest(format!("unknown provider: {}", other))),
    }
}
