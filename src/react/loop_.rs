//! ReAct 主循环
//!
//! Reason -> Decide -> Act (专家 Agent) -> Observe -> 下一轮 Reason；达到 Finish 或步数上限后合成最终答案。
//! 单步失败记为失败观察并继续，编排器自身只在输入非法时失败。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::agents::{
    CustomerInsightAgent, CustomerRequest, HealthRequest, NetworkHealthAgent, RemediationAgent, ResearchAgent,
    ResearchRequest,
};
use crate::core::{Agent, AgentError, AgentResult, LogLevel, RunContext};
use crate::react::events::{Observation, ReActStep, WorkflowRequest, WorkflowResult};
use crate::react::planner::{decide_action, reason, Action, Decision};

pub const ROLE_WORKFLOW: &str = "workflow-orchestrator";

/// 默认最大执行步数（不含最终合成步）
pub const DEFAULT_MAX_STEPS: usize = 5;
/// 研究结论在摘要中的最大字符数
const ANSWER_PREVIEW_CHARS: usize = 160;

/// 编排器可调度的专家 Agent
#[derive(Clone)]
pub struct AgentSet {
    pub health: Arc<NetworkHealthAgent>,
    pub customer: Arc<CustomerInsightAgent>,
    pub remediation: Arc<RemediationAgent>,
    pub research: Arc<ResearchAgent>,
}

pub struct WorkflowOrchestrator {
    agents: AgentSet,
    max_steps: usize,
}

fn into_outcome<T>(result: AgentResult<T>) -> Result<T, String> {
    match result.data {
        Some(data) if result.success => Ok(data),
        _ => Err(result.error.unwrap_or_else(|| "agent returned no data".to_string())),
    }
}

fn push_unique(list: &mut Vec<String>, role: &str) {
    if !list.iter().any(|r| r == role) {
        list.push(role.to_string());
    }
}

impl WorkflowOrchestrator {
    pub fn new(agents: AgentSet) -> Self {
        Self {
            agents,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// 执行一个动作，返回 (角色, 动作输入, 观察, 耗时)
    async fn act(
        &self,
        action: Action,
        query: &str,
        observations: &[Observation],
    ) -> (String, serde_json::Value, Observation, u64) {
        match action {
            Action::AnalyzeHealth => {
                let input = HealthRequest::new(query);
                let action_input = serde_json::to_value(&input).unwrap_or_default();
                let result = self.agents.health.run(input).await;
                let elapsed = result.execution_time_ms;
                let role = result.state.role.clone();
                (role, action_input, Observation::Health(into_outcome(result)), elapsed)
            }
            Action::AnalyzeCustomers => {
                let input = CustomerRequest::new(query);
                let action_input = serde_json::to_value(&input).unwrap_or_default();
                let result = self.agents.customer.run(input).await;
                let elapsed = result.execution_time_ms;
                let role = result.state.role.clone();
                (role, action_input, Observation::Customer(into_outcome(result)), elapsed)
            }
            Action::PlanRemediation => {
                let latest = observations.iter().rev().find_map(|o| match o {
                    Observation::Health(Ok(a)) => Some(a.clone()),
                    _ => None,
                });
                let role = self.agents.remediation.role().to_string();
                match latest {
                    Some(analysis) => {
                        let action_input = serde_json::json!({ "severity": analysis.overall_status });
                        let result = self.agents.remediation.run(analysis).await;
                        let elapsed = result.execution_time_ms;
                        (role, action_input, Observation::Remediation(into_outcome(result)), elapsed)
                    }
                    None => (
                        role,
                        serde_json::Value::Null,
                        Observation::Remediation(Err("no health analysis available".to_string())),
                        0,
                    ),
                }
            }
            Action::Research => {
                let input = ResearchRequest { query: query.to_string() };
                let action_input = serde_json::to_value(&input).unwrap_or_default();
                let result = self.agents.research.run(input).await;
                let elapsed = result.execution_time_ms;
                let role = result.state.role.clone();
                (role, action_input, Observation::Research(into_outcome(result)), elapsed)
            }
        }
    }
}

/// 汇总各观察为最终答案
pub fn synthesize(query: &str, observations: &[Observation], agents_used: &[String]) -> serde_json::Value {
    let mut summary = Vec::new();
    let mut failures = Vec::new();
    let mut sections = serde_json::Map::new();
    for key in ["health", "customer", "remediation", "research"] {
        sections.insert(key.to_string(), serde_json::Value::Null);
    }

    for obs in observations {
        if let Some(err) = obs.error() {
            summary.push(format!("{} failed: {}.", obs.action().as_str(), err));
            failures.push(serde_json::json!({ "action": obs.action().as_str(), "error": err }));
            continue;
        }
        let key = match obs {
            Observation::Health(Ok(a)) => {
                summary.push(format!(
                    "Network status is {} with {} issue(s).",
                    a.overall_status.as_str(),
                    a.issues.len()
                ));
                "health"
            }
            Observation::Customer(Ok(c)) => {
                let mood = c
                    .sentiment
                    .as_ref()
                    .map(|s| format!(", overall sentiment {}", s.overall.as_str()))
                    .unwrap_or_default();
                summary.push(format!("Customer churn risk is {}{}.", c.churn_risk.as_str(), mood));
                "customer"
            }
            Observation::Remediation(Ok(p)) => {
                match p.recommended() {
                    Some(rec) => summary.push(format!(
                        "{} remediation action(s) proposed, recommended: {}.",
                        p.actions.len(),
                        rec.title
                    )),
                    None => summary.push("No remediation actions available.".to_string()),
                }
                "remediation"
            }
            Observation::Research(Ok(r)) => {
                let preview: String = r.answer.chars().take(ANSWER_PREVIEW_CHARS).collect();
                summary.push(format!("Research: {}", preview));
                "research"
            }
            _ => continue,
        };
        sections.insert(key.to_string(), obs.data_json());
    }

    if summary.is_empty() {
        summary.push(format!("No observations collected for '{}'.", query));
    }

    sections.insert("summary".to_string(), serde_json::Value::String(summary.join(" ")));
    sections.insert("failures".to_string(), serde_json::Value::Array(failures));
    sections.insert("agents_used".to_string(), serde_json::json!(agents_used));
    serde_json::Value::Object(sections)
}

#[async_trait]
impl Agent for WorkflowOrchestrator {
    type Input = WorkflowRequest;
    type Output = WorkflowResult;

    fn role(&self) -> &str {
        ROLE_WORKFLOW
    }

    async fn execute(&self, input: WorkflowRequest, ctx: &mut RunContext) -> Result<WorkflowResult, AgentError> {
        let query = input.query.trim().to_string();
        if query.is_empty() {
            return Err(AgentError::InvalidInput("empty workflow query".to_string()));
        }
        // 请求只能收紧步数上限，不能放宽
        let max_steps = input.max_steps.map_or(self.max_steps, |m| m.min(self.max_steps));

        let mut steps: Vec<ReActStep> = Vec::new();
        let mut observations: Vec<Observation> = Vec::new();
        let mut agents_used: Vec<String> = Vec::new();

        loop {
            let thought = reason(&query, &observations);
            let action = match decide_action(&thought) {
                Decision::Invoke(action) => action,
                Decision::Finish => break,
            };
            if steps.len() >= max_steps {
                ctx.warn(format!("step budget of {} exhausted before finishing", max_steps));
                break;
            }

            let step_number = steps.len() + 1;
            let progress = (step_number.saturating_mul(90) / max_steps.saturating_add(1)).min(90) as u8;
            ctx.progress(format!("step {}: {}", step_number, action.as_str()), progress);

            let (role, action_input, observation, elapsed) = self.act(action, &query, &observations).await;
            if let Some(err) = observation.error() {
                ctx.log_with(
                    LogLevel::Warn,
                    format!("{} failed, continuing", action.as_str()),
                    serde_json::json!({ "agent": role, "error": err }),
                );
            } else {
                ctx.info(format!("{} finished in {}ms", action.as_str(), elapsed));
            }
            push_unique(&mut agents_used, &role);

            let mut observed = observation.to_json();
            if let Some(map) = observed.as_object_mut() {
                map.insert("execution_time_ms".to_string(), serde_json::json!(elapsed));
            }
            steps.push(ReActStep {
                step_number,
                thought: thought.text,
                action: action.as_str().to_string(),
                action_input,
                observation: observed,
                agents_involved: vec![role],
                timestamp: Utc::now(),
            });
            observations.push(observation);
        }

        ctx.progress("synthesizing final answer", 95);
        let final_answer = synthesize(&query, &observations, &agents_used);
        steps.push(ReActStep {
            step_number: steps.len() + 1,
            thought: "Combine the collected observations into a final answer.".to_string(),
            action: "synthesize".to_string(),
            action_input: serde_json::json!({ "observations": observations.len() }),
            observation: final_answer.clone(),
            agents_involved: Vec::new(),
            timestamp: Utc::now(),
        });

        let total_steps = steps.len();
        Ok(WorkflowResult {
            query,
            steps,
            final_answer,
            agents_used,
            total_steps,
        })
    }
}
