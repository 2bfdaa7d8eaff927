//! 编排层：关键词推理、动作决策、ReAct 工作流主循环

pub mod events;
pub mod loop_;
pub mod planner;

pub use events::{Observation, ReActStep, WorkflowRequest, WorkflowResult};
pub use loop_::{synthesize, AgentSet, WorkflowOrchestrator, DEFAULT_MAX_STEPS, ROLE_WORKFLOW};
pub use planner::{decide_action, reason, Action, Decision, Focus, Thought};
