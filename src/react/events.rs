//! ReAct 过程记录：步骤轨迹、观察与工作流结果

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{CustomerInsight, HealthAnalysis, RemediationPlan, ResearchAnswer};
use crate::react::planner::Action;

/// 单步记录（追加到一次工作流执行的有序轨迹）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReActStep {
    pub step_number: usize,
    pub thought: String,
    pub action: String,
    pub action_input: serde_json::Value,
    pub observation: serde_json::Value,
    pub agents_involved: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// 一次 Agent 调用的观察；Err 为失败信息
#[derive(Debug, Clone)]
pub enum Observation {
    Health(Result<HealthAnalysis, String>),
    Customer(Result<CustomerInsight, String>),
    Remediation(Result<RemediationPlan, String>),
    Research(Result<ResearchAnswer, String>),
}

fn outcome_json<T: Serialize>(outcome: &Result<T, String>) -> serde_json::Value {
    match outcome {
        Ok(data) => serde_json::json!({
            "success": true,
            "data": serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
        }),
        Err(e) => serde_json::json!({ "success": false, "error": e }),
    }
}

impl Observation {
    pub fn action(&self) -> Action {
        match self {
            Observation::Health(_) => Action::AnalyzeHealth,
            Observation::Customer(_) => Action::AnalyzeCustomers,
            Observation::Remediation(_) => Action::PlanRemediation,
            Observation::Research(_) => Action::Research,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Observation::Health(Err(e))
            | Observation::Customer(Err(e))
            | Observation::Remediation(Err(e))
            | Observation::Research(Err(e)) => Some(e.as_str()),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Observation::Health(o) => outcome_json(o),
            Observation::Customer(o) => outcome_json(o),
            Observation::Remediation(o) => outcome_json(o),
            Observation::Research(o) => outcome_json(o),
        }
    }

    /// 数据部分（失败时为 null）
    pub fn data_json(&self) -> serde_json::Value {
        let json = self.to_json();
        json.get("data").cloned().unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub query: String,
    /// 收紧编排器的步数上限；大于配置值时按配置值执行
    #[serde(default)]
    pub max_steps: Option<usize>,
}

impl WorkflowRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_steps: None,
        }
    }
}

/// 工作流执行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub query: String,
    pub steps: Vec<ReActStep>,
    pub final_answer: serde_json::Value,
    /// 按首次出现顺序的不同角色
    pub agents_used: Vec<String>,
    pub total_steps: usize,
}

impl WorkflowResult {
    /// 所有步骤 agents_involved 的展平序列
    pub fn agents_involved(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.agents_involved.iter().map(String::as_str))
            .collect()
    }
}
