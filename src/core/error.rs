//! 错误类型
//!
//! 按关注点划分：GatewayError（模型调用）、ScorerError（向量计算）、AgentError（Agent 执行）。
//! 解析模型输出从不报错，统一降级为文档化的默认值（见 agents::parsing）。

use thiserror::Error;

/// Model Provider Gateway 调用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// 缺少凭证：构造时即失败，不重试
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Gateway timeout after {0}s")]
    Timeout(u64),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// 词法评分器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScorerError {
    #[error("Vector length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Agent 执行过程中的错误；最终都会在 run() 中被转换为 success=false 的 AgentResult
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Agent panicked: {0}")]
    Panicked(String),

    #[error("Config error: {0}")]
    Config(String),
}
