//! 客服主流程
//!
//! START -> verify -> (load_memory | human_input)；human_input -> verify；
//! load_memory -> delegate -> persist_memory -> END。唯一的条件边在 verify 之后：
//! 已核验走 load_memory，否则走 human_input 挂起等待客户回复。

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, InteractionRecord};
use crate::memory::{Message, MemoryStoreAdapter, Role};
use crate::support::subagents::AgentRuntime;
use crate::support::supervisor::Supervisor;
use crate::support::verify::VerificationGate;
use crate::workflow::{
    Interrupt, Node, NodeContext, NodeOutcome, ResumeCommand, RunOutcome, WorkflowBuilder,
    WorkflowEngine, WorkflowError, WorkflowGraph, WorkflowStatus, END, START,
};

pub const VERIFY: &str = "verify";
pub const HUMAN_INPUT: &str = "human_input";
pub const LOAD_MEMORY: &str = "load_memory";
pub const DELEGATE: &str = "delegate";
pub const PERSIST_MEMORY: &str = "persist_memory";

type Outcome = Result<NodeOutcome<InteractionRecord>, AgentError>;

struct VerifyNode {
    gate: Arc<VerificationGate>,
}

#[async_trait]
impl Node<InteractionRecord, AgentError> for VerifyNode {
    async fn run(&self, mut record: InteractionRecord, _ctx: &NodeContext) -> Outcome {
        self.gate.verify(&mut record).await?;
        Ok(NodeOutcome::Continue(record))
    }
}

/// 没有恢复值时挂起（把最近的追问交给调用方），恢复时把客户输入追加为新消息
struct HumanInputNode;

#[async_trait]
impl Node<InteractionRecord, AgentError> for HumanInputNode {
    async fn run(&self, mut record: InteractionRecord, ctx: &NodeContext) -> Outcome {
        match &ctx.resume {
            Some(input) => {
                record.append(Message::user(input.clone()));
                Ok(NodeOutcome::Continue(record))
            }
            None => {
                let payload = record
                    .messages()
                    .messages()
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Assistant)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(NodeOutcome::Interrupt {
                    state: record,
                    payload,
                })
            }
        }
    }
}

struct LoadMemoryNode {
    memory: Arc<MemoryStoreAdapter>,
}

#[async_trait]
impl Node<InteractionRecord, AgentError> for LoadMemoryNode {
    async fn run(&self, mut record: InteractionRecord, _ctx: &NodeContext) -> Outcome {
        if record.loaded_memory().is_some() {
            return Ok(NodeOutcome::Continue(record));
        }
        let actor_id = record
            .actor_id()
            .ok_or_else(|| AgentError::InvariantViolation("load_memory reached without actor_id".to_string()))?
            .to_string();
        let memory = self.memory.load(&actor_id).await?;
        record.set_loaded_memory(memory)?;
        Ok(NodeOutcome::Continue(record))
    }
}

struct DelegateNode {
    supervisor: Arc<Supervisor>,
    runtime: Arc<AgentRuntime>,
}

#[async_trait]
impl Node<InteractionRecord, AgentError> for DelegateNode {
    async fn run(&self, mut record: InteractionRecord, _ctx: &NodeContext) -> Outcome {
        record.reset_step_budget(self.runtime.remaining_steps);
        let decisions = self.supervisor.run(&mut record, &self.runtime).await?;
        tracing::debug!(decisions = ?decisions, "delegation finished");
        Ok(NodeOutcome::Continue(record))
    }
}

struct PersistMemoryNode {
    memory: Arc<MemoryStoreAdapter>,
}

#[async_trait]
impl Node<InteractionRecord, AgentError> for PersistMemoryNode {
    async fn run(&self, record: InteractionRecord, _ctx: &NodeContext) -> Outcome {
        let actor_id = record
            .actor_id()
            .ok_or_else(|| AgentError::InvariantViolation("persist_memory reached without actor_id".to_string()))?;
        self.memory
            .save(actor_id, &record.messages().transcript())
            .await?;
        Ok(NodeOutcome::Continue(record))
    }
}

/// 组装客服流程图
pub fn build_support_graph(
    gate: Arc<VerificationGate>,
    memory: Arc<MemoryStoreAdapter>,
    supervisor: Arc<Supervisor>,
    runtime: Arc<AgentRuntime>,
) -> Result<WorkflowGraph<InteractionRecord, AgentError>, WorkflowError> {
    WorkflowBuilder::<InteractionRecord, AgentError>::new("customer_support")
        .node(VERIFY, Arc::new(VerifyNode { gate }))
        .node(HUMAN_INPUT, Arc::new(HumanInputNode))
        .node(LOAD_MEMORY, Arc::new(LoadMemoryNode { memory: memory.clone() }))
        .node(DELEGATE, Arc::new(DelegateNode { supervisor, runtime }))
        .node(PERSIST_MEMORY, Arc::new(PersistMemoryNode { memory }))
        .edge(START, VERIFY)
        .conditional_edge(VERIFY, &[LOAD_MEMORY, HUMAN_INPUT], |record: &InteractionRecord| {
            if record.is_verified() {
                LOAD_MEMORY.to_string()
            } else {
                HUMAN_INPUT.to_string()
            }
        })
        .edge(HUMAN_INPUT, VERIFY)
        .edge(LOAD_MEMORY, DELEGATE)
        .edge(DELEGATE, PERSIST_MEMORY)
        .edge(PERSIST_MEMORY, END)
        .build()
}

/// 一轮对话的结果
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// 流程走完，text 为给客户的最终答复
    Reply {
        text: String,
        record: InteractionRecord,
    },
    /// 流程挂起，等待客户输入（interrupt.payload 为追问内容）
    AwaitingInput {
        interrupt: Interrupt,
        record: InteractionRecord,
    },
}

impl TurnOutcome {
    /// 展示给客户的文本
    pub fn text(&self) -> &str {
        match self {
            TurnOutcome::Reply { text, .. } => text,
            TurnOutcome::AwaitingInput { interrupt, .. } => &interrupt.payload,
        }
    }

    pub fn record(&self) -> &InteractionRecord {
        match self {
            TurnOutcome::Reply { record, .. } | TurnOutcome::AwaitingInput { record, .. } => record,
        }
    }
}

impl From<RunOutcome<InteractionRecord>> for TurnOutcome {
    fn from(outcome: RunOutcome<InteractionRecord>) -> Self {
        match outcome {
            RunOutcome::Completed(record) => {
                let text = record
                    .messages()
                    .messages()
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::Assistant && !m.has_tool_calls())
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                TurnOutcome::Reply { text, record }
            }
            RunOutcome::Interrupted { state, interrupt } => TurnOutcome::AwaitingInput {
                interrupt,
                record: state,
            },
        }
    }
}

/// 客服助手：按会话线程驱动流程图
pub struct SupportAssistant {
    engine: WorkflowEngine<InteractionRecord, AgentError>,
    runtime: Arc<AgentRuntime>,
}

impl SupportAssistant {
    pub fn new(engine: WorkflowEngine<InteractionRecord, AgentError>, runtime: Arc<AgentRuntime>) -> Self {
        Self { engine, runtime }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.runtime.cancel_token.clone()
    }

    /// 客户发来新消息：新线程从头开始；已结束的线程追加消息后重新走一遍流程
    pub async fn send(&self, thread_id: &str, text: &str) -> Result<TurnOutcome, AgentError> {
        let record = match self.engine.get_state(thread_id).await? {
            None => InteractionRecord::from_user_message(text),
            Some(cp) if cp.status == WorkflowStatus::Interrupted => {
                return Err(WorkflowError::AwaitingResume(thread_id.to_string()).into());
            }
            Some(cp) => {
                let mut record = cp.state;
                record.append(Message::user(text));
                record
            }
        };
        tracing::info!(thread_id = %thread_id, "new turn");
        Ok(self.engine.invoke(thread_id, record).await?.into())
    }

    /// 恢复挂起的线程
    pub async fn resume(&self, thread_id: &str, command: ResumeCommand) -> Result<TurnOutcome, AgentError> {
        Ok(self.engine.resume(thread_id, command).await?.into())
    }

    /// 命令行便捷入口：挂起中的线程用这条输入恢复，否则作为新消息发送
    pub async fn reply(&self, thread_id: &str, text: &str) -> Result<TurnOutcome, AgentError> {
        let pending = self
            .engine
            .get_state(thread_id)
            .await?
            .and_then(|cp| cp.interrupt);
        match pending {
            Some(interrupt) => {
                self.resume(
                    thread_id,
                    ResumeCommand {
                        interrupt_id: interrupt.id,
                        value: text.to_string(),
                    },
                )
                .await
            }
            None => self.send(thread_id, text).await,
        }
    }

    pub async fn state(&self, thread_id: &str) -> Result<Option<InteractionRecord>, AgentError> {
        Ok(self.engine.get_state(thread_id).await?.map(|cp| cp.state))
    }

    pub async fn reset(&self, thread_id: &str) -> Result<bool, AgentError> {
        self.engine.clear(thread_id).await
    }
}
