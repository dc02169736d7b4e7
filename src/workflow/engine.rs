//! 工作流引擎
//!
//! 顺序执行图中的节点，每一步结束都把（状态 + 恢复点）写入检查点存储；
//! 节点请求中断时保存挂起信息并返回，调用方用 ResumeCommand 从被中断的节点继续。
//! 单次运行最多执行 max_iterations 个节点，防止图中的环无限循环。

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::StoreError;
use crate::memory::CheckpointStore;
use crate::workflow::graph::WorkflowGraph;
use crate::workflow::types::*;

pub struct WorkflowEngine<S, E> {
    graph: Arc<WorkflowGraph<S, E>>,
    checkpoints: Arc<dyn CheckpointStore>,
    max_iterations: usize,
    _error: PhantomData<fn() -> E>,
}

impl<S, E> WorkflowEngine<S, E>
where
    S: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    E: From<WorkflowError> + From<StoreError> + Send + 'static,
{
    pub fn new(
        graph: Arc<WorkflowGraph<S, E>>,
        checkpoints: Arc<dyn CheckpointStore>,
        max_iterations: usize,
    ) -> Self {
        Self {
            graph,
            checkpoints,
            max_iterations: max_iterations.max(1),
            _error: PhantomData,
        }
    }

    pub fn graph(&self) -> &WorkflowGraph<S, E> {
        &self.graph
    }

    /// 从 START 开始运行（覆盖该线程已有的检查点）
    pub async fn invoke(&self, thread_id: &str, state: S) -> Result<RunOutcome<S>, E> {
        let entry = self.graph.entry(&state)?;
        self.run_from(thread_id, entry, state, None, 0).await
    }

    /// 恢复一个挂起的线程：被中断的节点带着 value 重新执行
    pub async fn resume(&self, thread_id: &str, command: ResumeCommand) -> Result<RunOutcome<S>, E> {
        let checkpoint = self
            .get_state(thread_id)
            .await?
            .ok_or_else(|| WorkflowError::ThreadNotFound(thread_id.to_string()))?;
        let interrupt = match (checkpoint.status, &checkpoint.interrupt) {
            (WorkflowStatus::Interrupted, Some(interrupt)) => interrupt,
            _ => return Err(WorkflowError::NotInterrupted(thread_id.to_string()).into()),
        };
        if interrupt.id != command.interrupt_id {
            return Err(WorkflowError::InterruptMismatch {
                expected: interrupt.id.clone(),
                got: command.interrupt_id,
            }
            .into());
        }
        tracing::info!(thread_id = %thread_id, node = %checkpoint.next, "resuming");
        self.run_from(
            thread_id,
            checkpoint.next,
            checkpoint.state,
            Some(command.value),
            checkpoint.step,
        )
        .await
    }

    /// 读取线程的最新检查点
    pub async fn get_state(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, E> {
        let Some(raw) = self.checkpoints.get(thread_id).await? else {
            return Ok(None);
        };
        let checkpoint = serde_json::from_str(&raw)
            .map_err(|e| WorkflowError::Checkpoint(format!("{thread_id}: {e}")))?;
        Ok(Some(checkpoint))
    }

    pub async fn clear(&self, thread_id: &str) -> Result<bool, E> {
        Ok(self.checkpoints.delete(thread_id).await?)
    }

    async fn save(&self, checkpoint: &Checkpoint<S>) -> Result<(), E> {
        let raw = serde_json::to_string(checkpoint)
            .map_err(|e| WorkflowError::Checkpoint(format!("{}: {e}", checkpoint.thread_id)))?;
        self.checkpoints.put(&checkpoint.thread_id, &raw).await?;
        Ok(())
    }

    async fn run_from(
        &self,
        thread_id: &str,
        mut current: NodeId,
        mut state: S,
        mut resume: Option<String>,
        mut step: usize,
    ) -> Result<RunOutcome<S>, E> {
        for _ in 0..self.max_iterations {
            if current == END {
                self.save(&Checkpoint {
                    thread_id: thread_id.to_string(),
                    status: WorkflowStatus::Completed,
                    next: END.to_string(),
                    step,
                    interrupt: None,
                    state: state.clone(),
                })
                .await?;
                tracing::info!(workflow = %self.graph.name(), thread_id = %thread_id, step, "workflow completed");
                return Ok(RunOutcome::Completed(state));
            }

            let node = self.graph.node(&current)?;
            let ctx = NodeContext {
                thread_id: thread_id.to_string(),
                node: current.clone(),
                resume: resume.take(),
            };
            tracing::info!(workflow = %self.graph.name(), thread_id = %thread_id, node = %current, step, "node start");

            match node.run(state, &ctx).await? {
                NodeOutcome::Continue(next_state) => {
                    state = next_state;
                    current = self.graph.next(&current, &state)?;
                    step += 1;
                    self.save(&Checkpoint {
                        thread_id: thread_id.to_string(),
                        status: WorkflowStatus::Running,
                        next: current.clone(),
                        step,
                        interrupt: None,
                        state: state.clone(),
                    })
                    .await?;
                }
                NodeOutcome::Interrupt { state: next_state, payload } => {
                    let interrupt = Interrupt::new(current.clone(), payload);
                    self.save(&Checkpoint {
                        thread_id: thread_id.to_string(),
                        status: WorkflowStatus::Interrupted,
                        next: current.clone(),
                        step,
                        interrupt: Some(interrupt.clone()),
                        state: next_state.clone(),
                    })
                    .await?;
                    tracing::info!(thread_id = %thread_id, node = %current, interrupt_id = %interrupt.id, "workflow interrupted");
                    return Ok(RunOutcome::Interrupted {
                        state: next_state,
                        interrupt,
                    });
                }
            }
        }
        Err(WorkflowError::MaxIterationsExceeded(self.max_iterations).into())
    }
}
