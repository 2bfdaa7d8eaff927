//! 修复方案 Agent
//!
//! 按严重程度从模板中随机抽取有限个方案（critical 3 / warning 2 / healthy 1），
//! 成本、停机时间、预期改善各自乘以 [0.8, 1.2] 的随机系数，避免每次输出完全相同；
//! 单位成本改善最高的方案标记为推荐（恰好一个）。随机源可注入种子以便复现。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::agents::types::{HealthAnalysis, HealthStatus, PlanTemplate, RemediationAction, RemediationPlan};
use crate::agents::ROLE_REMEDIATION;
use crate::core::{Agent, AgentError, RunContext};
use crate::llm::{GenerateRequest, ModelGateway};

/// 扰动幅度（±20%）
pub const PERTURBATION: f64 = 0.2;

fn template(id: &str, title: &str, description: &str, cost: f64, downtime: f64, impact: f64, steps: &[&str]) -> PlanTemplate {
    PlanTemplate {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        base_cost: cost,
        base_downtime_minutes: downtime,
        base_impact: impact,
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

/// 内置方案模板
pub fn default_templates() -> Vec<PlanTemplate> {
    vec![
        template(
            "traffic-reroute",
            "Reroute traffic through alternate paths",
            "Shift load away from affected links using pre-approved BGP policies.",
            2500.0,
            5.0,
            35.0,
            &["Apply alternate route-map", "Verify path latency", "Monitor for 30 minutes"],
        ),
        template(
            "capacity-upgrade",
            "Add capacity on congested links",
            "Provision additional bandwidth on saturated backbone segments.",
            18000.0,
            60.0,
            55.0,
            &["Order capacity from carrier", "Schedule maintenance window", "Bring up new LAG members"],
        ),
        template(
            "router-failover",
            "Fail over to standby core router",
            "Move traffic to the hot-standby chassis while the primary is investigated.",
            4000.0,
            15.0,
            45.0,
            &["Drain primary router", "Promote standby", "Open vendor case"],
        ),
        template(
            "firmware-rollback",
            "Roll back recent firmware change",
            "Revert the last network OS upgrade on affected devices.",
            1200.0,
            30.0,
            25.0,
            &["Identify changed devices", "Roll back image", "Validate adjacency"],
        ),
        template(
            "qos-tuning",
            "Tune QoS policies for priority traffic",
            "Adjust queueing so latency-sensitive traffic is protected during congestion.",
            800.0,
            0.0,
            15.0,
            &["Review queue drops", "Raise priority class bandwidth", "Confirm customer latency"],
        ),
        template(
            "field-dispatch",
            "Dispatch field team to inspect fiber",
            "Send technicians to locate and repair physical-layer faults.",
            6500.0,
            120.0,
            60.0,
            &["Run OTDR trace", "Dispatch crew", "Splice and test"],
        ),
    ]
}

/// 各严重程度的方案数量上限
pub fn plan_count(severity: HealthStatus) -> usize {
    match severity {
        HealthStatus::Critical => 3,
        HealthStatus::Warning => 2,
        HealthStatus::Healthy => 1,
    }
}

pub struct RemediationAgent {
    templates: Vec<PlanTemplate>,
    rng: Mutex<StdRng>,
    gateway: Option<Arc<dyn ModelGateway>>,
}

impl RemediationAgent {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            templates: default_templates(),
            rng: Mutex::new(rng),
            gateway: None,
        }
    }

    pub fn with_templates(mut self, templates: Vec<PlanTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// 可选：请网关撰写推荐理由
    pub fn with_gateway(mut self, gateway: Arc<dyn ModelGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// 抽样并扰动；纯同步，锁不跨 await
    fn draft_actions(&self, severity: HealthStatus) -> Vec<RemediationAction> {
        let count = plan_count(severity).min(self.templates.len());
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let chosen: Vec<&PlanTemplate> = self.templates.choose_multiple(&mut *rng, count).collect();

        let mut actions: Vec<RemediationAction> = chosen
            .into_iter()
            .map(|t| {
                let mut jitter = || rng.gen_range((1.0 - PERTURBATION)..=(1.0 + PERTURBATION));
                RemediationAction {
                    template_id: t.id.clone(),
                    title: t.title.clone(),
                    description: t.description.clone(),
                    estimated_cost: t.base_cost * jitter(),
                    estimated_downtime_minutes: t.base_downtime_minutes * jitter(),
                    expected_impact: t.base_impact * jitter(),
                    steps: t.steps.clone(),
                    is_recommended: false,
                }
            })
            .collect();

        let best = actions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                let ra = a.expected_impact / a.estimated_cost.max(1.0);
                let rb = b.expected_impact / b.estimated_cost.max(1.0);
                ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);
        if let Some(i) = best {
            actions[i].is_recommended = true;
        }
        actions
    }
}

impl Default for RemediationAgent {
    fn default() -> Self {
        Self::new()
    }
}

fn templated_rationale(severity: HealthStatus, recommended: Option<&RemediationAction>) -> String {
    match recommended {
        Some(a) => format!(
            "Network status is {}. '{}' offers the best expected impact per unit cost ({:.0}% for ${:.0}).",
            severity.as_str(),
            a.title,
            a.expected_impact,
            a.estimated_cost
        ),
        None => format!("Network status is {}. No remediation templates available.", severity.as_str()),
    }
}

#[async_trait]
impl Agent for RemediationAgent {
    type Input = HealthAnalysis;
    type Output = RemediationPlan;

    fn role(&self) -> &str {
        ROLE_REMEDIATION
    }

    async fn execute(&self, input: HealthAnalysis, ctx: &mut RunContext) -> Result<RemediationPlan, AgentError> {
        let severity = input.overall_status;
        ctx.progress(format!("drafting plans for {} status", severity.as_str()), 20);
        let actions = self.draft_actions(severity);
        ctx.info(format!("selected {} plan(s)", actions.len()));

        let recommended = actions.iter().find(|a| a.is_recommended);
        let mut rationale = templated_rationale(severity, recommended);

        if let (Some(gateway), Some(rec)) = (&self.gateway, recommended) {
            ctx.progress("requesting rationale", 60);
            let prompt = format!(
                "Network status: {}. Issues: {}. Explain briefly why '{}' should be done first.",
                severity.as_str(),
                if input.issues.is_empty() { "none listed".to_string() } else { input.issues.join("; ") },
                rec.title
            );
            match gateway
                .generate(GenerateRequest::new(prompt).with_temperature(0.5).with_max_tokens(200))
                .await
            {
                Ok(resp) if !resp.content.trim().is_empty() => rationale = resp.content.trim().to_string(),
                Ok(_) => ctx.warn("empty rationale, using templated rationale"),
                Err(e) => ctx.warn(format!("rationale unavailable: {}", e)),
            }
        }

        ctx.progress("plan ready", 90);
        Ok(RemediationPlan {
            severity,
            actions,
            rationale,
        })
    }
}
