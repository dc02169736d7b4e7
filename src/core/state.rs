//! 交互记录：一次客服会话中向前累积的共享状态
//!
//! 节点按值接收并返回 InteractionRecord。字段私有，通过方法维持不变量：
//! - actor_id 一旦设置不可更改；
//! - loaded_memory 只能在 actor_id 已知后设置，且一次会话内只设置一次。

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::memory::{Message, MessageLog};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    messages: MessageLog,
    actor_id: Option<String>,
    loaded_memory: Option<String>,
    remaining_steps: Option<usize>,
}

impl InteractionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以一条用户消息开启会话
    pub fn from_user_message(content: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.append(Message::user(content));
        record
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn append(&mut self, msg: Message) -> bool {
        self.messages.push(msg)
    }

    pub fn append_all(&mut self, msgs: impl IntoIterator<Item = Message>) -> usize {
        self.messages.merge(msgs)
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn is_verified(&self) -> bool {
        self.actor_id.is_some()
    }

    /// 设置已核验的身份；重复设置相同值是幂等的，改写为不同值是错误
    pub fn set_actor_id(&mut self, id: impl Into<String>) -> Result<(), AgentError> {
        let id = id.into();
        match &self.actor_id {
            Some(existing) if *existing == id => Ok(()),
            Some(existing) => Err(AgentError::InvariantViolation(format!(
                "actor_id already set to {existing}, refusing to change it to {id}"
            ))),
            None => {
                self.actor_id = Some(id);
                Ok(())
            }
        }
    }

    pub fn loaded_memory(&self) -> Option<&str> {
        self.loaded_memory.as_deref()
    }

    pub fn set_loaded_memory(&mut self, memory: impl Into<String>) -> Result<(), AgentError> {
        if self.actor_id.is_none() {
            return Err(AgentError::InvariantViolation(
                "loaded_memory cannot be set before actor_id is resolved".to_string(),
            ));
        }
        if self.loaded_memory.is_some() {
            return Err(AgentError::InvariantViolation(
                "loaded_memory is already set for this session".to_string(),
            ));
        }
        self.loaded_memory = Some(memory.into());
        Ok(())
    }

    pub fn remaining_steps(&self) -> Option<usize> {
        self.remaining_steps
    }

    /// 为新一轮委派重置步数预算
    pub fn reset_step_budget(&mut self, steps: usize) {
        self.remaining_steps = Some(steps);
    }

    /// 消耗一步；预算为 0 时返回 false。未设置预算视为不限
    pub fn consume_step(&mut self) -> bool {
        match self.remaining_steps.as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        }
    }

    pub fn is_budget_exhausted(&self) -> bool {
        self.remaining_steps == Some(0)
    }
}
