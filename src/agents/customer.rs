//! 客户洞察 Agent
//!
//! 反馈来源：请求中的 feedback，缺省时使用检索到的反馈类上下文。
//! 先做词典情感统计，再请网关归纳主要关切与流失风险；解析缺失时：
//! - 关切列表为空
//! - 流失风险由平均情感推导（< -0.3 高，< 0 中，否则低）
//! - 摘要取情感统计描述

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::parsing::{first_paragraph, parse_churn_risk, section_items};
use crate::agents::sentiment::analyze_texts;
use crate::agents::types::{ChurnRisk, CustomerInsight, CustomerRequest, SentimentReport};
use crate::agents::ROLE_CUSTOMER_ANALYTICS;
use crate::core::{Agent, AgentError, LogLevel, RunContext};
use crate::llm::{GenerateRequest, ModelGateway};
use crate::memory::{ContextStore, SourceFilter};

const CONCERN_HEADERS: &[&str] = &["concerns", "top concerns", "complaints", "themes", "issues"];

const SYSTEM_PROMPT: &str = "You are a customer experience analyst for a network provider. \
Start with a one-sentence summary, then list Concerns as bullets, then a line 'Churn risk: low|medium|high'.";

pub fn churn_from_sentiment(report: Option<&SentimentReport>) -> ChurnRisk {
    match report.map(|r| r.average_score) {
        Some(avg) if avg < -0.3 => ChurnRisk::High,
        Some(avg) if avg < 0.0 => ChurnRisk::Medium,
        _ => ChurnRisk::Low,
    }
}

pub struct CustomerInsightAgent {
    gateway: Arc<dyn ModelGateway>,
    store: Option<Arc<ContextStore>>,
    sources: SourceFilter,
    top_k: usize,
}

impl CustomerInsightAgent {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            store: None,
            sources: SourceFilter::all(),
            top_k: 3,
        }
    }

    pub fn with_store(mut self, store: Arc<ContextStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 限定检索的来源（如 feedback、complaints）
    pub fn with_sources(mut self, sources: SourceFilter) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Agent for CustomerInsightAgent {
    type Input = CustomerRequest;
    type Output = CustomerInsight;

    fn role(&self) -> &str {
        ROLE_CUSTOMER_ANALYTICS
    }

    async fn execute(&self, input: CustomerRequest, ctx: &mut RunContext) -> Result<CustomerInsight, AgentError> {
        if input.query.trim().is_empty() && input.feedback.is_empty() {
            return Err(AgentError::InvalidInput("query or feedback required".to_string()));
        }

        ctx.progress("gathering customer feedback", 10);
        let mut sources = Vec::new();
        let mut texts = input.feedback.clone();
        if let Some(store) = &self.store {
            let retrieved = store.retrieve_from(&input.query, self.top_k, &self.sources).await;
            sources = retrieved.sources();
            if texts.is_empty() {
                texts = retrieved.documents.iter().map(|d| d.content.clone()).collect();
            }
        }

        ctx.progress("scoring sentiment", 30);
        let sentiment = if texts.is_empty() {
            ctx.warn("no customer feedback available");
            None
        } else {
            Some(analyze_texts(&texts))
        };

        ctx.progress("requesting insight from model", 50);
        let mut prompt = format!("Request: {}\n", input.query);
        if let Some(report) = &sentiment {
            prompt.push_str(&format!("Sentiment statistics: {}\n", report.summary));
        }
        if !texts.is_empty() {
            prompt.push_str("Feedback:\n");
            for t in &texts {
                prompt.push_str(&format!("- {}\n", t));
            }
        }
        let response = self
            .gateway
            .generate(
                GenerateRequest::new(prompt)
                    .with_system(SYSTEM_PROMPT)
                    .with_temperature(0.4)
                    .with_max_tokens(600),
            )
            .await?;

        ctx.progress("parsing insight", 80);
        let reply = response.content.as_str();
        let mut fallbacks = Vec::new();
        let top_concerns = section_items(reply, CONCERN_HEADERS).unwrap_or_else(|| {
            fallbacks.push("concerns");
            Vec::new()
        });
        let churn_risk = parse_churn_risk(reply).unwrap_or_else(|| {
            fallbacks.push("churn_risk");
            churn_from_sentiment(sentiment.as_ref())
        });
        let summary = first_paragraph(reply).unwrap_or_else(|| {
            fallbacks.push("summary");
            sentiment
                .as_ref()
                .map(|s| s.summary.clone())
                .unwrap_or_else(|| crate::agents::parsing::DEFAULT_SUMMARY.to_string())
        });
        if !fallbacks.is_empty() {
            ctx.log_with(
                LogLevel::Warn,
                "model reply missing sections, defaults applied",
                serde_json::json!({ "fallbacks": fallbacks }),
            );
        }

        Ok(CustomerInsight {
            summary,
            sentiment,
            top_concerns,
            churn_risk,
            sources,
        })
    }
}
