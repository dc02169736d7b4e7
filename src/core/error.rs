//! Agent 错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 AgentError 决定 RetryWithPrompt / SyntheticObservation / Abort。

use thiserror::Error;

use crate::llm::LlmError;
use crate::workflow::WorkflowError;

/// 存储层错误（客户目录、画像存储、检查点存储）
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Agent 运行过程中可能出现的错误（LLM、解析、工具、存储、状态不变量等）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Hallucinated tool: {0}")]
    HallucinatedTool(String),

    /// 存储不可用：对会话是致命的，直接上抛给调用方
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// 交互记录不变量被破坏（如 actor_id 被改写、未核验即加载记忆）
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Cancelled")]
    Cancelled,
}

impl From<crate::tools::RegistryError> for AgentError {
    fn from(e: crate::tools::RegistryError) -> Self {
        AgentError::ConfigError(e.to_string())
    }
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// 将提示注入下一轮，让 LLM 重试（如 JSON 格式错误）
    RetryWithPrompt(String),
    /// 以合成的工具结果回写对话，循环继续（工具失败 / 超时 / 未知工具）
    SyntheticObservation(String),
    /// 终止当前会话
    Abort,
}
