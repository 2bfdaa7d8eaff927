//! 工作流集成测试：临时语料 + MockGateway，经 Runtime 走完整链路

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use hive::agents::HealthStatus;
    use hive::core::{AgentStatus, LogLevel, RunContext};
    use hive::llm::{MockGateway, ModelGateway};
    use hive::{Agent, AgentError, AppConfig, Runtime, WorkflowRequest};

    const HEALTH_REPLY: &str = "Overall status: critical\n\
- Dallas: critical, 420ms latency after line card failure\n\
- Chicago: warning, 160ms latency\n\
- Seattle: healthy\n\
Issues:\n\
- Dallas core router dropping packets\n\
Recommendations:\n\
- Fail over Dallas to standby";

    const CUSTOMER_REPLY: &str = "Customers in Dallas are frustrated by the outage.\n\n\
Concerns:\n\
- Outage duration\n\
- Evening latency\n\n\
Churn risk: high";

    fn scripted_gateway() -> Arc<MockGateway> {
        Arc::new(
            MockGateway::new()
                .with_rule("network operations analyst", HEALTH_REPLY)
                .with_rule("customer experience analyst", CUSTOMER_REPLY),
        )
    }

    fn config_with_corpus(dir: &std::path::Path) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.rag.corpus_dir = dir.to_path_buf();
        cfg.agents.regions = vec!["Dallas".into(), "Chicago".into(), "Seattle".into()];
        cfg.agents.remediation_seed = Some(5);
        cfg
    }

    fn write_corpus(dir: &std::path::Path) {
        std::fs::write(dir.join("incidents.txt"), "Outage in Dallas caused high latency.").unwrap();
        std::fs::write(
            dir.join("feedback.txt"),
            "Customer complaint: the outage was awful and support was slow.",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_retrieval_through_runtime_store() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway: Arc<dyn ModelGateway> = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway).await;
        let store = runtime.store();

        assert_eq!(store.document_count().await, 2);
        let hit = store.retrieve("Dallas outage pattern", 1).await;
        assert_eq!(hit.total_retrieved, 1);
        assert!(hit.documents[0].score > 0.0);

        assert!(!store.should_retrieve("hello"));
        assert_eq!(store.retrieve("hello", 3).await.total_retrieved, 0);
    }

    #[tokio::test]
    async fn test_network_and_customer_workflow_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway.clone()).await;

        let result = runtime
            .orchestrator()
            .run(WorkflowRequest::new("analyze network and customer sentiment"))
            .await;
        assert!(result.success);
        assert_eq!(result.state.status, AgentStatus::Complete);
        assert_eq!(result.state.progress, 100);

        let wf = result.data.unwrap();
        let involved = wf.agents_involved();
        let health_at = involved.iter().position(|r| *r == "network-health").unwrap();
        let customer_at = involved.iter().position(|r| *r == "customer-analytics").unwrap();
        assert!(health_at < customer_at);
        assert!(wf.agents_used.contains(&"remediation-planner".to_string()));

        assert_eq!(wf.final_answer["health"]["overall_status"], "critical");
        assert_eq!(wf.final_answer["customer"]["churn_risk"], "high");
        let actions = wf.final_answer["remediation"]["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions.iter().filter(|a| a["is_recommended"] == true).count(), 1);

        // 客户洞察只读反馈类来源，健康分析看不到客户反馈
        let prompt_for = |needle: &str| {
            gateway
                .requests()
                .into_iter()
                .find(|r| r.system_prompt.as_deref().unwrap_or("").contains(needle))
                .unwrap()
                .prompt
        };
        let customer_prompt = prompt_for("customer experience analyst");
        assert!(customer_prompt.contains("support was slow"));
        assert!(!customer_prompt.contains("high latency"));
        let health_prompt = prompt_for("network operations analyst");
        assert!(!health_prompt.contains("support was slow"));

        assert_eq!(wf.final_answer["customer"]["sources"], serde_json::json!(["feedback.txt"]));
    }

    #[tokio::test]
    async fn test_health_context_comes_from_incident_sources_only() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway.clone()).await;

        let resp = runtime
            .services()
            .call("network-health", serde_json::json!({ "query": "Dallas outage" }))
            .await;
        assert!(resp.success);

        let prompt = &gateway.requests()[0].prompt;
        assert!(prompt.contains("Historical incidents:"));
        assert!(prompt.contains("incidents.txt"));
        assert!(!prompt.contains("feedback.txt"));
    }

    #[tokio::test]
    async fn test_concurrent_workflows_share_store() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway: Arc<dyn ModelGateway> = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway).await;
        let orchestrator = runtime.orchestrator();

        let (a, b) = tokio::join!(
            orchestrator.run(WorkflowRequest::new("network outage review")),
            orchestrator.run(WorkflowRequest::new("network latency trend")),
        );
        assert!(a.success && b.success);
        assert_ne!(a.state.run_id, b.state.run_id);
    }

    #[tokio::test]
    async fn test_repeated_workflows_do_not_grow_store() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway: Arc<dyn ModelGateway> = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway).await;
        let store = runtime.store();
        let chunks = store.chunk_count().await;

        for _ in 0..5 {
            let result = runtime
                .orchestrator()
                .run(WorkflowRequest::new("network outage and customer feedback"))
                .await;
            assert!(result.success);
        }
        assert_eq!(store.chunk_count().await, chunks);
        assert_eq!(
            store.sources().await,
            vec!["feedback.txt".to_string(), "incidents.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn test_service_endpoints_through_runtime() {
        let dir = tempfile::tempdir().unwrap();
        write_corpus(dir.path());
        let gateway: Arc<dyn ModelGateway> = scripted_gateway();
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway).await;
        let services = runtime.services();

        let health = services
            .call("network-health", serde_json::json!({ "query": "Dallas outage" }))
            .await;
        assert!(health.success);
        assert_eq!(health.data["overall_status"], "critical");
        assert_eq!(health.data["regions"].as_array().unwrap().len(), 3);

        let plan = services
            .call("remediation", serde_json::json!({ "overall_status": "critical" }))
            .await;
        assert!(plan.success);
        assert_eq!(plan.data["actions"].as_array().unwrap().len(), 3);

        let bad = services.call("workflow", serde_json::json!({ "goal": 1 })).await;
        assert!(!bad.success);
    }

    #[tokio::test]
    async fn test_failing_gateway_keeps_workflow_alive() {
        let dir = tempfile::tempdir().unwrap();
        let gateway: Arc<dyn ModelGateway> =
            Arc::new(MockGateway::failing(hive::core::GatewayError::Provider("503".into())));
        let runtime = Runtime::with_gateway(config_with_corpus(dir.path()), gateway).await;

        let wf = runtime
            .orchestrator()
            .run(WorkflowRequest::new("network health and customer feedback"))
            .await
            .data
            .unwrap();
        let failures = wf.final_answer["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 2);
        assert!(wf.final_answer["summary"].as_str().unwrap().contains("failed"));
    }

    struct BrokenAgent;

    #[async_trait]
    impl Agent for BrokenAgent {
        type Input = HealthStatus;
        type Output = String;

        fn role(&self) -> &str {
            "broken"
        }

        async fn execute(&self, input: HealthStatus, ctx: &mut RunContext) -> Result<String, AgentError> {
            ctx.progress("about to fail", 40);
            Err(AgentError::Execution(format!("cannot handle {}", input.as_str())))
        }
    }

    #[tokio::test]
    async fn test_failing_agent_returns_structured_failure() {
        let result = BrokenAgent.run(HealthStatus::Warning).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.state.status, AgentStatus::Error);
        assert!(result.state.progress < 100);
        assert!(result.logs.iter().any(|l| l.level == LogLevel::Error));
        assert_eq!(result.error.as_deref(), Some("Execution failed: cannot handle warning"));
    }
}
