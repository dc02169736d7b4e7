//! 主管（Supervisor）：在子智能体之间路由
//!
//! 路由以交接工具 `transfer_to_<agent>` 的形式暴露给模型。一次回复里的第一个合法交接生效，
//! 子智能体运行完后按输出模式把它的消息并入共享历史，主管再决定下一步；
//! 回复不含工具请求即为给客户的最终答复。每次主管调用也消耗共享步数预算。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::OutputMode;
use crate::core::{AgentError, InteractionRecord, RecoveryAction};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::react::loop_::send_event;
use crate::react::{parse_llm_output, Planner, PlannerOutput, ReactEvent, BUDGET_EXHAUSTED_MESSAGE};
use crate::support::prompts::{tool_protocol_section, SUPERVISOR_PROMPT};
use crate::support::subagents::{AgentRuntime, SubAgent};
use crate::tools::{RegistryError, Tool, ToolExecutor, ToolRegistry};

pub const SUPERVISOR_NAME: &str = "supervisor";

pub fn handoff_tool_name(agent: &str) -> String {
    format!("transfer_to_{agent}")
}

/// 交接工具：只用于向模型声明可交接的对象，执行结果是交接确认
pub struct HandoffTool {
    name: String,
    agent: String,
    description: String,
}

impl HandoffTool {
    pub fn new(agent: &str) -> Self {
        Self {
            name: handoff_tool_name(agent),
            agent: agent.to_string(),
            description: format!("Ask agent '{agent}' for help. Takes no arguments."),
        }
    }
}

#[async_trait]
impl Tool for HandoffTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, _args: Value) -> Result<String, String> {
        Ok(format!("Successfully transferred to {}", self.agent))
    }
}

/// 主管在一次委派中做出的决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// 交给某个子智能体
    Delegate(String),
    /// 给出最终答复
    Finish(String),
    /// 预算耗尽
    Exhausted,
}

pub struct Supervisor {
    llm: Arc<dyn LlmClient>,
    agents: Vec<SubAgent>,
    handoffs: ToolExecutor,
    output_mode: OutputMode,
}

impl Supervisor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        agents: Vec<SubAgent>,
        output_mode: OutputMode,
    ) -> Result<Self, RegistryError> {
        let registry = ToolRegistry::from_tools(
            agents
                .iter()
                .map(|a| Arc::new(HandoffTool::new(a.name())) as Arc<dyn Tool>),
        )?;
        Ok(Self {
            llm,
            agents,
            handoffs: ToolExecutor::new(Arc::new(registry), 5),
            output_mode,
        })
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(SubAgent::name).collect()
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "{SUPERVISOR_PROMPT}\n\n{}",
            tool_protocol_section(self.handoffs.registry())
        )
    }

    fn agent_for(&self, tool: &str) -> Option<&SubAgent> {
        self.agents
            .iter()
            .find(|a| handoff_tool_name(a.name()) == tool)
    }

    /// 委派直到主管给出最终答复或预算耗尽；返回本次做出的决定序列
    pub async fn run(
        &self,
        record: &mut InteractionRecord,
        runtime: &AgentRuntime,
    ) -> Result<Vec<RoutingDecision>, AgentError> {
        let planner = Planner::new(self.llm.clone(), self.system_prompt());
        let events = runtime.event_tx.as_ref();
        let mut decisions = Vec::new();

        loop {
            if runtime.cancel_token.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            if !record.consume_step() {
                tracing::warn!("supervisor ran out of steps");
                send_event(events, ReactEvent::BudgetExhausted {
                    agent: SUPERVISOR_NAME.to_string(),
                });
                record.append(Message::assistant(BUDGET_EXHAUSTED_MESSAGE).with_name(SUPERVISOR_NAME));
                decisions.push(RoutingDecision::Exhausted);
                return Ok(decisions);
            }

            let output = planner.plan(record.messages().messages()).await?;
            let calls = match parse_llm_output(&output) {
                Ok(PlannerOutput::Response(text)) => {
                    send_event(events, ReactEvent::FinalMessage {
                        agent: SUPERVISOR_NAME.to_string(),
                        text: text.clone(),
                    });
                    record.append(Message::assistant(text.clone()).with_name(SUPERVISOR_NAME));
                    decisions.push(RoutingDecision::Finish(text));
                    return Ok(decisions);
                }
                Ok(PlannerOutput::ToolCalls(calls)) => calls,
                Err(e) => match runtime.recovery.handle(&e, &self.handoffs.tool_names()) {
                    RecoveryAction::RetryWithPrompt(prompt) => {
                        record.append(Message::assistant(output).with_name(SUPERVISOR_NAME));
                        record.append(Message::recovery(prompt));
                        continue;
                    }
                    _ => return Err(e),
                },
            };

            record.append(Message::assistant_tool_calls("", calls.clone()).with_name(SUPERVISOR_NAME));
            let mut target: Option<&SubAgent> = None;
            for call in &calls {
                let reply = match self.handoffs.execute(&call.tool, call.args.clone()).await {
                    Ok(confirmation) if target.is_none() => {
                        target = self.agent_for(&call.tool);
                        confirmation
                    }
                    Ok(_) => "Error: only one transfer is handled per step; this one was ignored.".to_string(),
                    Err(e) => match runtime.recovery.handle(&e, &self.handoffs.tool_names()) {
                        RecoveryAction::SyntheticObservation(text) => text,
                        _ => return Err(e),
                    },
                };
                record.append(Message::tool(call, reply));
            }

            let Some(agent) = target else {
                tracing::warn!("supervisor requested no valid transfer");
                continue;
            };
            tracing::info!(agent = %agent.name(), "delegating");
            send_event(events, ReactEvent::Handoff {
                from: SUPERVISOR_NAME.to_string(),
                to: agent.name().to_string(),
            });
            decisions.push(RoutingDecision::Delegate(agent.name().to_string()));

            let outcome = agent.run(record, runtime).await?;
            match self.output_mode {
                OutputMode::LastMessage => {
                    if let Some(last) = outcome.messages.last() {
                        record.append(last.clone());
                    }
                }
                OutputMode::FullHistory => {
                    record.append_all(outcome.messages);
                }
            }
        }
    }
}
