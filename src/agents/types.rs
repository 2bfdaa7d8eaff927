//! 专家 Agent 的输入输出类型
//!
//! 全部可 JSON 序列化，作为服务边界的请求与响应体。

use serde::{Deserialize, Serialize};

/// 健康状态，按严重程度排序：Healthy < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn needs_remediation(self) -> bool {
        matches!(self, HealthStatus::Warning | HealthStatus::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthRequest {
    #[serde(default = "default_health_query")]
    pub query: String,
    /// 覆盖默认跟踪区域
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// 调用方提供的原始指标，原样放入提示词
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
}

fn default_health_query() -> String {
    "network health overview".to_string()
}

impl HealthRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionHealth {
    pub region: String,
    pub status: HealthStatus,
    pub latency_ms: Option<f32>,
    pub note: String,
}

/// 健康分析：字段总是完整填充（缺失部分使用默认值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalysis {
    pub overall_status: HealthStatus,
    /// 每个跟踪区域一条
    #[serde(default)]
    pub regions: Vec<RegionHealth>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl HealthAnalysis {
    /// 仅有总体状态的最小分析（测试与服务调用方便）
    pub fn with_status(status: HealthStatus) -> Self {
        Self {
            overall_status: status,
            regions: Vec::new(),
            issues: Vec::new(),
            recommendations: Vec::new(),
            summary: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentRequest {
    pub texts: Vec<String>,
    /// 是否请求网关生成主题摘要
    #[serde(default)]
    pub summarize: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentItem {
    pub text: String,
    /// [-1, 1]
    pub score: f32,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub average_score: f32,
    pub overall: SentimentLabel,
    pub distribution: SentimentDistribution,
    pub items: Vec<SentimentItem>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChurnRisk {
    Low,
    Medium,
    High,
}

impl ChurnRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            ChurnRisk::Low => "low",
            ChurnRisk::Medium => "medium",
            ChurnRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub query: String,
    /// 客户反馈原文；为空时使用检索到的上下文
    #[serde(default)]
    pub feedback: Vec<String>,
}

impl CustomerRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            feedback: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsight {
    pub summary: String,
    pub sentiment: Option<SentimentReport>,
    pub top_concerns: Vec<String>,
    pub churn_risk: ChurnRisk,
    pub sources: Vec<String>,
}

/// 修复方案模板：数值字段为基准值，实际方案在 ±20% 内扰动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub base_cost: f64,
    pub base_downtime_minutes: f64,
    /// 预期改善百分比
    pub base_impact: f64,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationAction {
    pub template_id: String,
    pub title: String,
    pub description: String,
    pub estimated_cost: f64,
    pub estimated_downtime_minutes: f64,
    pub expected_impact: f64,
    pub steps: Vec<String>,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub severity: HealthStatus,
    pub actions: Vec<RemediationAction>,
    pub rationale: String,
}

impl RemediationPlan {
    pub fn recommended(&self) -> Option<&RemediationAction> {
        self.actions.iter().find(|a| a.is_recommended)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchAnswer {
    pub answer: String,
    pub sources: Vec<String>,
    pub context_used: bool,
}
