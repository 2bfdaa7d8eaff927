//! Agent 框架：统一的 run / state / log 契约
//!
//! 具体 Agent 只实现 execute；run 负责状态机包装：
//! 置 Running/0 -> 调用 execute -> 成功置 Complete/100，失败（Err 或 panic）置 Error。
//! 每次 run 都新建 RunContext，因此同一 Agent 实例可被多次、并发调用而互不影响。

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

use crate::core::error::AgentError;
use crate::core::state::{AgentLog, AgentState, AgentStatus, LogLevel};

/// 单次运行的终态产物，所有权转移给调用方
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<AgentLog>,
    pub state: AgentState,
    pub execution_time_ms: u64,
}

impl<T> AgentResult<T> {
    /// 是否存在 error 级别日志
    pub fn has_error_log(&self) -> bool {
        self.logs.iter().any(|l| l.level == LogLevel::Error)
    }
}

/// 单次运行上下文：独占状态与日志
pub struct RunContext {
    state: AgentState,
    logs: Vec<AgentLog>,
}

impl RunContext {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            state: AgentState::new(role),
            logs: Vec::new(),
        }
    }

    pub fn role(&self) -> &str {
        &self.state.role
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn logs(&self) -> &[AgentLog] {
        &self.logs
    }

    /// 里程碑更新。终态（Complete / Error）只由 run() 设置，这里会被拒绝
    pub fn update_state(&mut self, status: AgentStatus, message: impl Into<String>, progress: Option<u8>) -> bool {
        let message = message.into();
        if status.is_terminal() {
            self.warn(format!("refused terminal status {:?} from execute: {}", status, message));
            return false;
        }
        let ok = self.state.transition(status, message.clone(), progress);
        if !ok {
            self.warn(format!(
                "refused transition {:?} -> {:?}: {}",
                self.state.status, status, message
            ));
        }
        ok
    }

    /// Running 状态下的进度更新简写
    pub fn progress(&mut self, message: impl Into<String>, progress: u8) {
        self.update_state(AgentStatus::Running, message, Some(progress));
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(AgentLog::new(level, self.state.role.clone(), message));
    }

    pub fn log_with(&mut self, level: LogLevel, message: impl Into<String>, payload: serde_json::Value) {
        self.push(AgentLog::new(level, self.state.role.clone(), message).with_payload(payload));
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// 追加日志并同步输出 tracing 事件
    fn push(&mut self, entry: AgentLog) {
        let run_id = self.state.run_id.as_str();
        match entry.level {
            LogLevel::Debug => tracing::debug!(role = %entry.role, run_id = %run_id, "{}", entry.message),
            LogLevel::Info => tracing::info!(role = %entry.role, run_id = %run_id, "{}", entry.message),
            LogLevel::Warn => tracing::warn!(role = %entry.role, run_id = %run_id, "{}", entry.message),
            LogLevel::Error => tracing::error!(role = %entry.role, run_id = %run_id, "{}", entry.message),
        }
        self.logs.push(entry);
    }

    fn start(&mut self) {
        self.state.transition(AgentStatus::Running, "started", Some(0));
        self.info("run started");
    }

    fn finish<T>(mut self, outcome: Result<T, AgentError>, started: Instant) -> AgentResult<T> {
        let execution_time_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(data) => {
                self.state.transition(AgentStatus::Complete, "completed", Some(100));
                self.info(format!("run completed in {}ms", execution_time_ms));
                AgentResult {
                    success: true,
                    data: Some(data),
                    error: None,
                    logs: self.logs,
                    state: self.state,
                    execution_time_ms,
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.state.transition(AgentStatus::Error, message.clone(), None);
                self.error(format!("run failed: {}", message));
                AgentResult {
                    success: false,
                    data: None,
                    error: Some(message),
                    logs: self.logs,
                    state: self.state,
                    execution_time_ms,
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 专家 Agent：声明角色并实现 execute
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// 角色名，如 network-health
    fn role(&self) -> &str;

    /// 具体任务；在里程碑处调用 ctx.update_state / ctx.progress
    async fn execute(&self, input: Self::Input, ctx: &mut RunContext) -> Result<Self::Output, AgentError>;

    /// 状态机包装；任何失败都以 success=false 返回，不会向外抛出
    async fn run(&self, input: Self::Input) -> AgentResult<Self::Output> {
        let started = Instant::now();
        let mut ctx = RunContext::new(self.role());
        ctx.start();

        let outcome = AssertUnwindSafe(self.execute(input, &mut ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(AgentError::Panicked(panic_message(payload))));

        ctx.finish(outcome, started)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// 记录每次里程碑后的 progress，便于断言单调性
    struct MilestoneAgent {
        seen: Mutex<Vec<(AgentStatus, u8)>>,
    }

    #[async_trait]
    impl Agent for MilestoneAgent {
        type Input = Vec<u8>;
        type Output = usize;

        fn role(&self) -> &str {
            "milestone"
        }

        async fn execute(&self, input: Vec<u8>, ctx: &mut RunContext) -> Result<usize, AgentError> {
            for p in &input {
                ctx.progress(format!("step {}", p), *p);
                let s = ctx.state();
                self.seen.lock().unwrap().push((s.status, s.progress));
            }
            Ok(input.len())
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        type Input = ();
        type Output = String;

        fn role(&self) -> &str {
            "failing"
        }

        async fn execute(&self, _input: (), ctx: &mut RunContext) -> Result<String, AgentError> {
            ctx.progress("about to fail", 30);
            Err(AgentError::Execution("upstream exploded".to_string()))
        }
    }

    struct PanickingAgent;

    #[async_trait]
    impl Agent for PanickingAgent {
        type Input = ();
        type Output = String;

        fn role(&self) -> &str {
            "panicking"
        }

        async fn execute(&self, _input: (), _ctx: &mut RunContext) -> Result<String, AgentError> {
            panic!("index out of range");
        }
    }

    #[tokio::test]
    async fn test_progress_monotonic_and_100_only_when_complete() {
        let agent = MilestoneAgent { seen: Mutex::new(Vec::new()) };
        let result = agent.run(vec![10, 50, 30, 100, 70]).await;

        let seen = agent.seen.lock().unwrap().clone();
        let progresses: Vec<u8> = seen.iter().map(|(_, p)| *p).collect();
        assert_eq!(progresses, vec![10, 50, 50, 99, 99]);
        assert!(seen.iter().all(|(s, p)| *s == AgentStatus::Running && *p < 100));

        assert!(result.success);
        assert_eq!(result.data, Some(5));
        assert_eq!(result.state.status, AgentStatus::Complete);
        assert_eq!(result.state.progress, 100);
        assert!(result.state.end_time.is_some());
    }

    #[tokio::test]
    async fn test_failing_execute_returns_structured_failure() {
        let result = FailingAgent.run(()).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.state.status, AgentStatus::Error);
        assert!(result.state.progress < 100);
        assert!(result.has_error_log());
        assert!(result.error.unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_panic_inside_execute_is_contained() {
        let result = PanickingAgent.run(()).await;
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.state.status, AgentStatus::Error);
        assert!(result.error.as_deref().unwrap_or("").contains("index out of range"));
        assert!(result.has_error_log());
    }

    #[test]
    fn test_update_state_refuses_terminal_status() {
        let mut ctx = RunContext::new("x");
        ctx.start();
        assert!(!ctx.update_state(AgentStatus::Complete, "early", Some(100)));
        assert_eq!(ctx.state().status, AgentStatus::Running);
        assert!(ctx.logs().iter().any(|l| l.level == LogLevel::Warn));
    }
}
