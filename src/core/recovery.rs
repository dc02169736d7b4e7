//! 错误恢复引擎
//!
//! 根据 AgentError 类型返回 RecoveryAction，供工具调用循环决定是重试、合成观察结果还是终止。
//! 工具失败不会中止循环：以 "Error: ..." 形式的工具结果回写，交给模型自行调整。

use crate::core::{AgentError, RecoveryAction};

/// 语义化错误恢复：将错误映射为可执行动作
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// valid_tools 用于在模型调用不存在的工具时提示可用名单
    pub fn handle(&self, err: &AgentError, valid_tools: &[String]) -> RecoveryAction {
        match err {
            AgentError::JsonParseError(raw) => RecoveryAction::RetryWithPrompt(format!(
                "Your previous output was not valid JSON: {raw}. \
                 To call tools you must output only one JSON object of the form \
                 {{\"tool_calls\": [{{\"tool\": \"<name>\", \"args\": {{...}}}}]}} and nothing else. \
                 To answer the customer, reply in plain text without JSON."
            )),
            AgentError::HallucinatedTool(name) => RecoveryAction::SyntheticObservation(format!(
                "Error: tool '{name}' does not exist. Available tools: {}",
                valid_tools.join(", ")
            )),
            AgentError::ToolTimeout(name) => {
                RecoveryAction::SyntheticObservation(format!("Error: tool '{name}' timed out"))
            }
            AgentError::ToolExecutionFailed(msg) => {
                RecoveryAction::SyntheticObservation(format!("Error: {msg}"))
            }
            _ => RecoveryAction::Abort,
        }
    }
}
