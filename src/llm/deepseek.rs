//! DeepSeek API 网关（OpenAI 兼容格式）
//!
//! - Base URL: https://api.deepseek.com
//! - 模型: deepseek-chat (常规对话), deepseek-reasoner (思考模式)

use crate::core::GatewayError;
use crate::llm::openai::resolve_api_key;
use crate::llm::OpenAiGateway;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
pub const DEEPSEEK_REASONER: &str = "deepseek-reasoner";

/// 创建 DeepSeek 网关
///
/// - Key 取自参数或环境变量 `DEEPSEEK_API_KEY`，缺失时为配置错误
/// - 模型可通过 `model` 参数或 `DEEPSEEK_MODEL` 环境变量指定，默认 deepseek-chat
pub fn create_deepseek_gateway(
    model: Option<&str>,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> Result<OpenAiGateway, GatewayError> {
    let api_key = resolve_api_key(api_key, "DEEPSEEK_API_KEY")?;

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    OpenAiGateway::new(Some(DEEPSEEK_BASE_URL), &model, Some(api_key.as_str()), timeout_secs)
}
