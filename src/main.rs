//! Hive - 多 Agent 编排
//!
//! 入口：初始化日志、加载配置、构建运行时，对命令行给出的目标执行一次工作流并输出 JSON 结果。

use anyhow::Context;
use hive::{load_config, observability, Agent, AppConfig, Runtime, WorkflowRequest};

const DEFAULT_GOAL: &str = "analyze network health and customer sentiment";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    let goal = if args.is_empty() {
        DEFAULT_GOAL.to_string()
    } else {
        args.join(" ")
    };

    let runtime = Runtime::from_config(cfg)
        .await
        .context("Failed to build runtime")?;

    let result = runtime.orchestrator().run(WorkflowRequest::new(goal)).await;
    if !result.success {
        tracing::error!("Workflow failed: {}", result.error.as_deref().unwrap_or("unknown error"));
    }

    let json = serde_json::to_string_pretty(&result).context("Failed to encode result")?;
    println!("{}", json);
    Ok(())
}
