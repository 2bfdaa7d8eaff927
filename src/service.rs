//! 服务边界：每个端点一次 JSON 请求 -> 一次 JSON 响应
//!
//! 输入 JSON 非法、端点未知或 Agent 失败都返回 success=false，不会 panic。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::agents::{CustomerInsightAgent, NetworkHealthAgent, RemediationAgent, ResearchAgent, SentimentAgent};
use crate::core::{Agent, AgentLog, AgentState};
use crate::react::WorkflowOrchestrator;

pub const ENDPOINT_NETWORK_HEALTH: &str = "network-health";
pub const ENDPOINT_SENTIMENT: &str = "sentiment";
pub const ENDPOINT_CUSTOMER_INSIGHT: &str = "customer-insight";
pub const ENDPOINT_REMEDIATION: &str = "remediation";
pub const ENDPOINT_RESEARCH: &str = "research";
pub const ENDPOINT_WORKFLOW: &str = "workflow";

pub const ENDPOINTS: &[&str] = &[
    ENDPOINT_NETWORK_HEALTH,
    ENDPOINT_SENTIMENT,
    ENDPOINT_CUSTOMER_INSIGHT,
    ENDPOINT_REMEDIATION,
    ENDPOINT_RESEARCH,
    ENDPOINT_WORKFLOW,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub success: bool,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<AgentLog>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AgentState>,
    /// 毫秒
    pub execution_time: u64,
}

impl ServiceResponse {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: serde_json::Value::Null,
            error: Some(message.into()),
            logs: None,
            state: None,
            execution_time: 0,
        }
    }
}

/// 端点到 Agent 的映射；Agent 以 Arc 共享，同一注册表可并发调用
#[derive(Clone)]
pub struct ServiceRegistry {
    pub health: Arc<NetworkHealthAgent>,
    pub sentiment: Arc<SentimentAgent>,
    pub customer: Arc<CustomerInsightAgent>,
    pub remediation: Arc<RemediationAgent>,
    pub research: Arc<ResearchAgent>,
    pub workflow: Arc<WorkflowOrchestrator>,
}

async fn invoke<A>(agent: &A, payload: serde_json::Value) -> ServiceResponse
where
    A: Agent,
    A::Input: DeserializeOwned,
    A::Output: Serialize,
{
    let input: A::Input = match serde_json::from_value(payload) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(role = %agent.role(), "rejected request: {}", e);
            return ServiceResponse::rejected(format!("invalid input for {}: {}", agent.role(), e));
        }
    };

    let result = agent.run(input).await;
    let (data, error) = match result.data.map(serde_json::to_value) {
        Some(Ok(value)) => (value, result.error),
        Some(Err(e)) => (serde_json::Value::Null, Some(format!("failed to encode output: {}", e))),
        None => (serde_json::Value::Null, result.error),
    };
    ServiceResponse {
        success: result.success && error.is_none(),
        data,
        error,
        logs: Some(result.logs),
        state: Some(result.state),
        execution_time: result.execution_time_ms,
    }
}

impl ServiceRegistry {
    pub async fn call(&self, endpoint: &str, payload: serde_json::Value) -> ServiceResponse {
        tracing::debug!(endpoint = %endpoint, "service call");
        match endpoint {
            ENDPOINT_NETWORK_HEALTH => invoke(self.health.as_ref(), payload).await,
            ENDPOINT_SENTIMENT => invoke(self.sentiment.as_ref(), payload).await,
            ENDPOINT_CUSTOMER_INSIGHT => invoke(self.customer.as_ref(), payload).await,
            ENDPOINT_REMEDIATION => invoke(self.remediation.as_ref(), payload).await,
            ENDPOINT_RESEARCH => invoke(self.research.as_ref(), payload).await,
            ENDPOINT_WORKFLOW => invoke(self.workflow.as_ref(), payload).await,
            other => {
                tracing::warn!("unknown endpoint: {}", other);
                ServiceResponse::rejected(format!("unknown endpoint: {}", other))
            }
        }
    }
}
