//! 网络健康分析 Agent
//!
//! 可选检索历史故障上下文（只看故障类来源）-> 以较高温度调用网关（措辞多样）
//! -> 启发式解析为 HealthAnalysis。分析结果只返回给调用方，不写回存储。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::parsing::parse_health_report;
use crate::agents::types::{HealthAnalysis, HealthRequest};
use crate::agents::ROLE_NETWORK_HEALTH;
use crate::core::{Agent, AgentError, LogLevel, RunContext};
use crate::llm::{GenerateRequest, ModelGateway};
use crate::memory::{ContextStore, SourceFilter};

const SYSTEM_PROMPT: &str = "You are a network operations analyst. Report an overall status line, \
one line per region with status and latency, then an Issues section and a Recommendations section.";

pub struct NetworkHealthAgent {
    gateway: Arc<dyn ModelGateway>,
    store: Option<Arc<ContextStore>>,
    sources: SourceFilter,
    regions: Vec<String>,
    temperature: f32,
    top_k: usize,
}

impl NetworkHealthAgent {
    pub fn new(gateway: Arc<dyn ModelGateway>, regions: Vec<String>) -> Self {
        Self {
            gateway,
            store: None,
            sources: SourceFilter::all(),
            regions,
            temperature: 0.8,
            top_k: 3,
        }
    }

    pub fn with_store(mut self, store: Arc<ContextStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 限定检索的来源（如 incidents、runbooks）
    pub fn with_sources(mut self, sources: SourceFilter) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn build_prompt(
        query: &str,
        regions: &[String],
        metrics: Option<&serde_json::Value>,
        context: &str,
    ) -> String {
        let mut prompt = format!("Request: {}\nTracked regions: {}\n", query, regions.join(", "));
        if let Some(m) = metrics {
            prompt.push_str(&format!("Current metrics:\n{}\n", m));
        }
        if !context.is_empty() {
            prompt.push_str("\nHistorical incidents:\n");
            prompt.push_str(context);
        }
        prompt
    }
}

#[async_trait]
impl Agent for NetworkHealthAgent {
    type Input = HealthRequest;
    type Output = HealthAnalysis;

    fn role(&self) -> &str {
        ROLE_NETWORK_HEALTH
    }

    async fn execute(&self, input: HealthRequest, ctx: &mut RunContext) -> Result<HealthAnalysis, AgentError> {
        let query = if input.query.trim().is_empty() {
            "network health overview".to_string()
        } else {
            input.query.clone()
        };
        let regions = input
            .regions
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.regions.clone());

        ctx.progress("retrieving incident history", 10);
        let mut context = String::new();
        if let Some(store) = &self.store {
            let retrieved = store.retrieve_from(&query, self.top_k, &self.sources).await;
            ctx.log_with(
                LogLevel::Debug,
                "incident context retrieved",
                serde_json::json!({
                    "documents": retrieved.total_retrieved,
                    "sources": retrieved.sources(),
                }),
            );
            context = retrieved.as_context();
        }

        ctx.progress("requesting analysis from model", 30);
        let prompt = Self::build_prompt(&query, &regions, input.metrics.as_ref(), &context);
        let response = self
            .gateway
            .generate(
                GenerateRequest::new(prompt)
                    .with_system(SYSTEM_PROMPT)
                    .with_temperature(self.temperature)
                    .with_max_tokens(800),
            )
            .await?;

        ctx.progress("parsing analysis", 70);
        let parsed = parse_health_report(&response.content, &regions);
        if !parsed.fallbacks.is_empty() {
            ctx.log_with(
                LogLevel::Warn,
                "model reply missing sections, defaults applied",
                serde_json::json!({ "fallbacks": parsed.fallbacks }),
            );
        }
        let analysis = parsed.value;

        ctx.progress("analysis ready", 90);
        ctx.info(format!(
            "overall status {} with {} issues",
            analysis.overall_status.as_str(),
            analysis.issues.len()
        ));
        Ok(analysis)
    }
}
