//! 工作流类型定义
//!
//! 节点、边、中断、恢复命令、检查点等核心数据类型

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type NodeId = String;

/// 虚拟起点与终点
pub const START: &str = "__start__";
pub const END: &str = "__end__";

/// 节点执行时的上下文
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub thread_id: String,
    pub node: NodeId,
    /// 从中断恢复时调用方提供的输入；只交给被中断的那个节点，且只交一次
    pub resume: Option<String>,
}

/// 节点的执行结果
#[derive(Debug)]
pub enum NodeOutcome<S> {
    /// 沿出边继续
    Continue(S),
    /// 挂起，等待外部输入；payload 展示给调用方
    Interrupt { state: S, payload: String },
}

/// 工作流节点：按值接收状态、返回更新后的状态
#[async_trait]
pub trait Node<S, E>: Send + Sync {
    async fn run(&self, state: S, ctx: &NodeContext) -> Result<NodeOutcome<S>, E>;
}

/// 条件边的路由函数：根据当前状态返回下一个节点名
pub type Router<S> = Box<dyn Fn(&S) -> NodeId + Send + Sync>;

/// 出边
pub enum Edge<S> {
    Fixed(NodeId),
    Conditional {
        /// 路由可能返回的全部目标（构建时校验）
        targets: Vec<NodeId>,
        router: Router<S>,
    },
}

/// 一次挂起
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    pub id: String,
    pub node: NodeId,
    pub payload: String,
}

impl Interrupt {
    pub fn new(node: impl Into<NodeId>, payload: impl Into<String>) -> Self {
        Self {
            id: format!("int_{}", uuid::Uuid::new_v4().simple()),
            node: node.into(),
            payload: payload.into(),
        }
    }
}

/// 恢复命令：interrupt_id 必须与挂起时给出的一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCommand {
    pub interrupt_id: String,
    pub value: String,
}

/// 线程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// 正在执行（检查点落在两步之间）
    Running,
    /// 已挂起，等待恢复
    Interrupted,
    /// 已到达 END
    Completed,
}

/// 每一步结束时保存的检查点：状态 + 恢复点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub thread_id: String,
    pub status: WorkflowStatus,
    /// 下一个要执行的节点（恢复点）
    pub next: NodeId,
    pub step: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt: Option<Interrupt>,
    pub state: S,
}

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<S> {
    Completed(S),
    Interrupted { state: S, interrupt: Interrupt },
}

/// 工作流错误类型
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),
    #[error("Node {0} has no outgoing edge")]
    MissingEdge(NodeId),
    #[error("Router of {from} returned undeclared target {to}")]
    UndeclaredTarget { from: NodeId, to: NodeId },
    #[error("Invalid workflow configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Exceeded {0} steps without reaching the end")]
    MaxIterationsExceeded(usize),
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),
    #[error("Thread {0} is not waiting for input")]
    NotInterrupted(String),
    #[error("Thread {0} is waiting for input, resume it instead")]
    AwaitingResume(String),
    #[error("Interrupt id mismatch: expected {expected}, got {got}")]
    InterruptMismatch { expected: String, got: String },
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
}
