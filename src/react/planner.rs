//! 推理与决策：纯关键词分类，不调用模型
//!
//! reason 根据目标文本与已有观察给出下一步关注点，decide_action 将关注点映射为动作。
//! 动作集合有限且每类最多执行一次，因此循环必然终止。

use serde::{Deserialize, Serialize};

use crate::react::events::Observation;

/// 基础设施 / 网络类关键词
pub const INFRASTRUCTURE_TERMS: &[&str] = &[
    "network",
    "infrastructure",
    "latency",
    "outage",
    "router",
    "bandwidth",
    "packet",
    "uptime",
    "health",
    "region",
    "fiber",
    "connectivity",
    "tower",
    "backbone",
];

/// 客户 / 情感类关键词
pub const CUSTOMER_TERMS: &[&str] = &[
    "customer",
    "sentiment",
    "feedback",
    "complaint",
    "satisfaction",
    "churn",
    "subscriber",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    AnalyzeHealth,
    AnalyzeCustomers,
    PlanRemediation,
    Research,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::AnalyzeHealth => "analyze_health",
            Action::AnalyzeCustomers => "analyze_customers",
            Action::PlanRemediation => "plan_remediation",
            Action::Research => "research",
        }
    }
}

/// 决策结果：调用某个专家，或结束循环进入合成
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Invoke(Action),
    Finish,
}

/// 推理得出的关注点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Infrastructure,
    Customer,
    Remediation,
    General,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thought {
    pub focus: Focus,
    pub text: String,
}

fn mentions(query: &str, terms: &[&str]) -> bool {
    let lower = query.to_lowercase();
    terms.iter().any(|t| lower.contains(t))
}

pub fn wants_infrastructure(query: &str) -> bool {
    mentions(query, INFRASTRUCTURE_TERMS)
}

pub fn wants_customer(query: &str) -> bool {
    mentions(query, CUSTOMER_TERMS)
}

/// 下一步关注点；优先级：网络健康 -> 触发的修复 -> 客户洞察 -> 通用研究 -> 完成
pub fn reason(query: &str, observations: &[Observation]) -> Thought {
    let done = |action| observations.iter().any(|o| o.action() == action);
    let infra = wants_infrastructure(query);
    let customer = wants_customer(query);

    if infra && !done(Action::AnalyzeHealth) {
        return Thought {
            focus: Focus::Infrastructure,
            text: "The goal concerns network infrastructure; analyze network health first.".to_string(),
        };
    }

    let degraded = observations.iter().rev().find_map(|o| match o {
        Observation::Health(Ok(a)) if a.overall_status.needs_remediation() => Some(a.overall_status),
        _ => None,
    });
    if let Some(status) = degraded {
        if !done(Action::PlanRemediation) {
            return Thought {
                focus: Focus::Remediation,
                text: format!(
                    "Network health is {}; a remediation plan is required.",
                    status.as_str()
                ),
            };
        }
    }

    if customer && !done(Action::AnalyzeCustomers) {
        return Thought {
            focus: Focus::Customer,
            text: "The goal mentions customers or sentiment; gather customer insight.".to_string(),
        };
    }

    if !infra && !customer && !done(Action::Research) {
        return Thought {
            focus: Focus::General,
            text: "No specialist domain matched; run generic research.".to_string(),
        };
    }

    Thought {
        focus: Focus::Complete,
        text: "All planned actions finished; synthesize the final answer.".to_string(),
    }
}

pub fn decide_action(thought: &Thought) -> Decision {
    match thought.focus {
        Focus::Infrastructure => Decision::Invoke(Action::AnalyzeHealth),
        Focus::Customer => Decision::Invoke(Action::AnalyzeCustomers),
        Focus::Remediation => Decision::Invoke(Action::PlanRemediation),
        Focus::General => Decision::Invoke(Action::Research),
        Focus::Complete => Decision::Finish,
    }
}
