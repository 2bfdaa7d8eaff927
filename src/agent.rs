//! Agent 运行时
//!
//! 进程启动时构建一次：网关、上下文存储（已初始化）、各专家 Agent、工作流编排器与服务注册表，
//! 之后以 Arc 共享给所有调用方。

use std::sync::Arc;

use crate::agents::{CustomerInsightAgent, NetworkHealthAgent, RemediationAgent, ResearchAgent, SentimentAgent};
use crate::config::AppConfig;
use crate::core::AgentError;
use crate::llm::{create_gateway_from_config, ModelGateway};
use crate::memory::{ContextStore, KeywordGate, DEFAULT_RETRIEVAL_KEYWORDS};
use crate::react::{AgentSet, WorkflowOrchestrator};
use crate::service::ServiceRegistry;

pub struct Runtime {
    config: AppConfig,
    gateway: Arc<dyn ModelGateway>,
    store: Arc<ContextStore>,
    orchestrator: Arc<WorkflowOrchestrator>,
    services: ServiceRegistry,
}

impl Runtime {
    /// 按配置创建网关；真实后端缺少凭证时返回 AgentError::Config
    pub async fn from_config(config: AppConfig) -> Result<Self, AgentError> {
        let gateway = create_gateway_from_config(&config).map_err(|e| AgentError::Config(e.to_string()))?;
        Ok(Self::with_gateway(config, gateway).await)
    }

    /// 使用外部提供的网关（测试中注入 MockGateway）
    pub async fn with_gateway(config: AppConfig, gateway: Arc<dyn ModelGateway>) -> Self {
        let gate = match &config.rag.retrieval_keywords {
            Some(keywords) => KeywordGate::new(keywords),
            None => KeywordGate::new(DEFAULT_RETRIEVAL_KEYWORDS),
        };
        let store = Arc::new(ContextStore::with_gate(config.rag.store_config(), Arc::new(gate)));
        let loaded = store.initialize().await;
        tracing::info!(
            "Context store ready: {} document(s) from {}",
            loaded,
            store.corpus_dir().display()
        );

        let top_k = config.rag.top_k;
        let health = Arc::new(
            NetworkHealthAgent::new(gateway.clone(), config.agents.regions.clone())
                .with_store(store.clone())
                .with_sources(config.rag.incident_filter())
                .with_temperature(config.agents.health_temperature)
                .with_top_k(top_k),
        );
        let customer = Arc::new(
            CustomerInsightAgent::new(gateway.clone())
                .with_store(store.clone())
                .with_sources(config.rag.feedback_filter())
                .with_top_k(top_k),
        );
        let remediation = Arc::new(match config.agents.remediation_seed {
            Some(seed) => RemediationAgent::with_seed(seed),
            None => RemediationAgent::new(),
        });
        let research = Arc::new(
            ResearchAgent::new(gateway.clone())
                .with_store(store.clone())
                .with_top_k(top_k),
        );
        let sentiment = Arc::new(SentimentAgent::new().with_gateway(gateway.clone()));

        let set = AgentSet {
            health: health.clone(),
            customer: customer.clone(),
            remediation: remediation.clone(),
            research: research.clone(),
        };
        let orchestrator = Arc::new(WorkflowOrchestrator::new(set).with_max_steps(config.workflow.max_steps));

        let services = ServiceRegistry {
            health,
            sentiment,
            customer,
            remediation,
            research,
            workflow: orchestrator.clone(),
        };

        Self {
            config,
            gateway,
            store,
            orchestrator,
            services,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn gateway(&self) -> Arc<dyn ModelGateway> {
        self.gateway.clone()
    }

    pub fn store(&self) -> Arc<ContextStore> {
        self.store.clone()
    }

    pub fn orchestrator(&self) -> Arc<WorkflowOrchestrator> {
        self.orchestrator.clone()
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_provider_is_config_error() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "carrier-pigeon".to_string();
        let err = Runtime::from_config(cfg).await.err().unwrap();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[tokio::test]
    async fn test_mock_runtime_uses_configured_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.rag.corpus_dir = dir.path().to_path_buf();
        cfg.workflow.max_steps = 2;
        let runtime = Runtime::from_config(cfg).await.unwrap();
        assert_eq!(runtime.orchestrator().max_steps(), 2);
        assert!(runtime.store().is_initialized());
        assert_eq!(runtime.gateway().name(), "mock");
    }
}
