//! 通用研究 Agent：目标不属于任何专家领域时的兜底

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::types::{ResearchAnswer, ResearchRequest};
use crate::agents::ROLE_RESEARCH;
use crate::core::{Agent, AgentError, RunContext};
use crate::llm::{GenerateRequest, ModelGateway};
use crate::memory::ContextStore;

pub struct ResearchAgent {
    gateway: Arc<dyn ModelGateway>,
    store: Option<Arc<ContextStore>>,
    top_k: usize,
}

impl ResearchAgent {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            store: None,
            top_k: 3,
        }
    }

    pub fn with_store(mut self, store: Arc<ContextStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    type Input = ResearchRequest;
    type Output = ResearchAnswer;

    fn role(&self) -> &str {
        ROLE_RESEARCH
    }

    async fn execute(&self, input: ResearchRequest, ctx: &mut RunContext) -> Result<ResearchAnswer, AgentError> {
        if input.query.trim().is_empty() {
            return Err(AgentError::InvalidInput("empty query".to_string()));
        }

        ctx.progress("retrieving context", 20);
        let (context, sources) = match &self.store {
            Some(store) => {
                let retrieved = store.retrieve(&input.query, self.top_k).await;
                (retrieved.as_context(), retrieved.sources())
            }
            None => (String::new(), Vec::new()),
        };

        ctx.progress("asking model", 50);
        let prompt = if context.is_empty() {
            input.query.clone()
        } else {
            format!("Answer using the context below.\n\n{}Question: {}", context, input.query)
        };
        let response = self
            .gateway
            .generate(GenerateRequest::new(prompt).with_temperature(0.3))
            .await?;

        Ok(ResearchAnswer {
            answer: response.content.trim().to_string(),
            context_used: !context.is_empty(),
            sources,
        })
    }
}
