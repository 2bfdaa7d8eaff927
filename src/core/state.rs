//! Agent 运行状态与结构化日志
//!
//! AgentState 由单次运行独占；状态只允许 Idle -> Running -> {Complete | Error}，
//! progress 单调不减，且当且仅当 Complete 时为 100。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agent 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Running,
    Complete,
    Error,
}

impl AgentStatus {
    /// 是否允许从 self 迁移到 next（Running -> Running 视为同态更新）
    pub fn can_transition_to(self, next: AgentStatus) -> bool {
        matches!(
            (self, next),
            (AgentStatus::Idle, AgentStatus::Running)
                | (AgentStatus::Running, AgentStatus::Running)
                | (AgentStatus::Running, AgentStatus::Complete)
                | (AgentStatus::Running, AgentStatus::Error)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AgentStatus::Complete | AgentStatus::Error)
    }
}

/// 单次运行的状态快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub run_id: String,
    pub role: String,
    pub status: AgentStatus,
    pub message: String,
    /// 0-100
    pub progress: u8,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AgentState {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            role: role.into(),
            status: AgentStatus::Idle,
            message: String::new(),
            progress: 0,
            start_time: None,
            end_time: None,
        }
    }

    /// 尝试迁移状态；非法迁移返回 false 且不修改任何字段
    ///
    /// progress 取 max(当前, 请求值)，非 Complete 状态最多 99，Complete 固定为 100。
    pub fn transition(&mut self, status: AgentStatus, message: impl Into<String>, progress: Option<u8>) -> bool {
        if !self.status.can_transition_to(status) {
            return false;
        }
        let now = Utc::now();
        if self.status == AgentStatus::Idle {
            self.start_time = Some(now);
        }
        self.status = status;
        self.message = message.into();
        self.progress = match status {
            AgentStatus::Complete => 100,
            _ => progress.unwrap_or(self.progress).max(self.progress).min(99),
        };
        if status.is_terminal() {
            self.end_time = Some(now);
        }
        true
    }

    /// 显式复用：回到 Idle 并换新 run_id
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.role));
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// 不可变的结构化日志条目，按运行累积
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLog {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub role: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl AgentLog {
    pub fn new(level: LogLevel, role: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            role: role.into(),
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
