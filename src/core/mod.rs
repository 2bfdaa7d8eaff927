//! 核心层：Agent 契约、运行状态与日志、错误类型

pub mod agent;
pub mod error;
pub mod state;

pub use agent::{Agent, AgentResult, RunContext};
pub use error::{AgentError, GatewayError, ScorerError};
pub use state::{AgentLog, AgentState, AgentStatus, LogLevel};
