//! Hive - 多 Agent 网络运营编排核心
//!
//! 模块划分：
//! - **agent**: 运行时构建（网关、上下文存储、专家 Agent、编排器、服务注册表）
//! - **agents**: 专家 Agent（网络健康、情感、客户洞察、修复方案、通用研究）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: Agent 契约、运行状态与日志、错误类型
//! - **llm**: Model Provider Gateway 抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 词法评分、检索闸门、RAG 上下文存储
//! - **observability**: tracing 订阅器初始化
//! - **react**: 关键词推理与 ReAct 工作流编排
//! - **service**: 端点 JSON 请求/响应边界

pub mod agent;
pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod service;

pub use agent::Runtime;
pub use config::{load_config, AppConfig};
pub use core::{Agent, AgentError, AgentResult};
pub use react::{WorkflowOrchestrator, WorkflowRequest, WorkflowResult};
pub use service::{ServiceRegistry, ServiceResponse};
