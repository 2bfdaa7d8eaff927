//! 专家 Agent：网络健康、情感评分、客户洞察、修复方案、通用研究

pub mod customer;
pub mod health;
pub mod parsing;
pub mod remediation;
pub mod research;
pub mod sentiment;
pub mod types;

pub use customer::CustomerInsightAgent;
pub use health::NetworkHealthAgent;
pub use remediation::RemediationAgent;
pub use research::ResearchAgent;
pub use sentiment::SentimentAgent;
pub use types::*;

pub const ROLE_NETWORK_HEALTH: &str = "network-health";
pub const ROLE_SENTIMENT: &str = "sentiment-analysis";
pub const ROLE_CUSTOMER_ANALYTICS: &str = "customer-analytics";
pub const ROLE_REMEDIATION: &str = "remediation-planner";
pub const ROLE_RESEARCH: &str = "research";
