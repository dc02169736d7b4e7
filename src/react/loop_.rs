//! 有界工具调用循环
//!
//! Plan -> 若请求工具则按顺序逐个执行、写回结果 -> 再次 Plan；回复不含工具请求时结束。
//! 每次 LLM 调用消耗交互记录中共享预算的一步，预算耗尽时追加固定的道歉消息并返回（非致命）。
//! 工具失败、超时、未知工具都以 "Error: ..." 工具结果回写，循环继续。

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, InteractionRecord, RecoveryAction, RecoveryEngine};
use crate::memory::Message;
use crate::react::{parse_llm_output, Planner, PlannerOutput, ReactEvent};
use crate::tools::ToolExecutor;

/// 预算耗尽时追加的消息
pub const BUDGET_EXHAUSTED_MESSAGE: &str = "Sorry, need more steps to process this request.";
/// Observation 预览最大字符数
const OBSERVATION_PREVIEW_CHARS: usize = 200;

/// 工具循环的运行配置
pub struct ReactSession<'a> {
    /// 写入消息 name 字段与事件的智能体名
    pub agent_name: &'a str,
    pub planner: &'a Planner,
    pub executor: &'a ToolExecutor,
    pub recovery: &'a RecoveryEngine,
    pub cancel_token: CancellationToken,
    /// 可选：事件推送通道
    pub event_tx: Option<&'a UnboundedSender<ReactEvent>>,
}

impl<'a> ReactSession<'a> {
    pub fn new(
        agent_name: &'a str,
        planner: &'a Planner,
        executor: &'a ToolExecutor,
        recovery: &'a RecoveryEngine,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            agent_name,
            planner,
            executor,
            recovery,
            cancel_token,
            event_tx: None,
        }
    }

    pub fn with_event_tx(mut self, tx: Option<&'a UnboundedSender<ReactEvent>>) -> Self {
        self.event_tx = tx;
        self
    }

    fn emit(&self, ev: ReactEvent) {
        send_event(self.event_tx, ev);
    }
}

pub fn send_event(tx: Option<&UnboundedSender<ReactEvent>>, ev: ReactEvent) {
    if let Some(t) = tx {
        let _ = t.send(ev);
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// 一次循环的结果：本次新产生的消息（不含已有历史）
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub messages: Vec<Message>,
    pub exhausted: bool,
}

impl LoopOutcome {
    /// 最后一条消息的文本（最终回复或预算耗尽提示）
    pub fn final_text(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }
}

/// 运行工具循环：历史取自 record，步数预算也记在 record 上；新消息不写回 record，由调用方决定如何合并
pub async fn run_tool_loop(
    session: &ReactSession<'_>,
    record: &mut InteractionRecord,
) -> Result<LoopOutcome, AgentError> {
    let agent = session.agent_name;
    let mut produced: Vec<Message> = Vec::new();
    let mut step = 0;

    loop {
        if session.cancel_token.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        if !record.consume_step() {
            tracing::warn!(agent = %agent, "step budget exhausted");
            session.emit(ReactEvent::BudgetExhausted {
                agent: agent.to_string(),
            });
            produced.push(Message::assistant(BUDGET_EXHAUSTED_MESSAGE).with_name(agent));
            return Ok(LoopOutcome {
                messages: produced,
                exhausted: true,
            });
        }
        session.emit(ReactEvent::StepUpdate {
            agent: agent.to_string(),
            step,
            remaining: record.remaining_steps(),
        });

        let history: Vec<Message> = record
            .messages()
            .messages()
            .iter()
            .chain(produced.iter())
            .cloned()
            .collect();
        let output = session.planner.plan(&history).await?;

        match parse_llm_output(&output) {
            Ok(PlannerOutput::Response(text)) => {
                session.emit(ReactEvent::FinalMessage {
                    agent: agent.to_string(),
                    text: text.clone(),
                });
                produced.push(Message::assistant(text).with_name(agent));
                return Ok(LoopOutcome {
                    messages: produced,
                    exhausted: false,
                });
            }
            Ok(PlannerOutput::ToolCalls(calls)) => {
                produced.push(Message::assistant_tool_calls("", calls.clone()).with_name(agent));
                for call in &calls {
                    session.emit(ReactEvent::ToolCall {
                        agent: agent.to_string(),
                        tool: call.tool.clone(),
                        args: call.args.clone(),
                    });
                    let observation = match session.executor.execute(&call.tool, call.args.clone()).await {
                        Ok(result) => result,
                        Err(e) => match session.recovery.handle(&e, &session.executor.tool_names()) {
                            RecoveryAction::SyntheticObservation(text) => {
                                tracing::warn!(agent = %agent, tool = %call.tool, error = %e, "tool failed");
                                session.emit(ReactEvent::ToolFailure {
                                    agent: agent.to_string(),
                                    tool: call.tool.clone(),
                                    reason: e.to_string(),
                                });
                                text
                            }
                            _ => return Err(e),
                        },
                    };
                    session.emit(ReactEvent::Observation {
                        agent: agent.to_string(),
                        tool: call.tool.clone(),
                        preview: preview(&observation, OBSERVATION_PREVIEW_CHARS),
                    });
                    produced.push(Message::tool(call, observation));
                }
            }
            Err(e) => match session.recovery.handle(&e, &session.executor.tool_names()) {
                RecoveryAction::RetryWithPrompt(prompt) => {
                    session.emit(ReactEvent::Recovery {
                        action: "RetryWithPrompt".to_string(),
                        detail: prompt.clone(),
                    });
                    produced.push(Message::assistant(output).with_name(agent));
                    produced.push(Message::recovery(prompt));
                }
                _ => return Err(e),
            },
        }

        step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::memory::Role;
    use crate::tools::{ParamKind, ParamSpec, Tool, ToolDescriptor, ToolRegistry};
    use std::sync::Arc;

    fn executor() -> ToolExecutor {
        let echo = ToolDescriptor::new(
            "echo",
            "Echo the text.",
            vec![ParamSpec::required("text", ParamKind::String, "Text")],
            "the same text.",
            |a| a.str("text").to_string(),
        );
        let registry = ToolRegistry::from_tools(vec![Arc::new(echo) as Arc<dyn Tool>]).unwrap();
        ToolExecutor::new(Arc::new(registry), 5)
    }

    async fn run(llm: Arc<ScriptedLlmClient>, record: &mut InteractionRecord) -> LoopOutcome {
        let planner = Planner::new(llm, "system");
        let executor = executor();
        let recovery = RecoveryEngine::new();
        let session = ReactSession::new("agent", &planner, &executor, &recovery, CancellationToken::new());
        run_tool_loop(&session, record).await.unwrap()
    }

    #[tokio::test]
    async fn test_tools_run_in_order_then_answer() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool_calls": [{"tool": "echo", "args": {"text": "one"}}, {"tool": "echo", "args": {"text": "two"}}]}"#,
            "done",
        ]));
        let mut record = InteractionRecord::from_user_message("hi");
        record.reset_step_budget(5);
        let out = run(llm.clone(), &mut record).await;

        let roles: Vec<Role> = out.messages.iter().map(|m| m.role.clone()).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::Tool, Role::Tool, Role::Assistant]);
        assert_eq!(out.messages[1].content, "one");
        assert_eq!(out.messages[2].content, "two");
        assert_eq!(out.final_text(), "done");
        assert_eq!(out.messages[3].name.as_deref(), Some("agent"));
        assert!(!out.exhausted);
        assert_eq!(record.remaining_steps(), Some(3));
        // 第二次调用能看到两条工具结果
        assert_eq!(llm.requests()[1].len(), 1 + 1 + 3);
        // 新消息不写回 record
        assert_eq!(record.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_become_observations() {
        let llm = Arc::new(ScriptedLlmClient::new([
            r#"{"tool_calls": [{"tool": "nope", "args": {}}, {"tool": "echo", "args": {}}]}"#,
            "sorry",
        ]));
        let mut record = InteractionRecord::from_user_message("hi");
        let out = run(llm, &mut record).await;
        assert!(out.messages[1].content.starts_with("Error: tool 'nope' does not exist. Available tools: echo"));
        assert!(out.messages[2].content.contains("missing required argument 'text'"));
        assert_eq!(out.final_text(), "sorry");
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_not_fatal() {
        let call = r#"{"tool_calls": [{"tool": "echo", "args": {"text": "again"}}]}"#;
        let llm = Arc::new(ScriptedLlmClient::new([call, call, call]));
        let mut record = InteractionRecord::from_user_message("hi");
        record.reset_step_budget(2);
        let out = run(llm.clone(), &mut record).await;
        assert!(out.exhausted);
        assert_eq!(out.final_text(), BUDGET_EXHAUSTED_MESSAGE);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_call_is_retried_with_prompt() {
        let llm = Arc::new(ScriptedLlmClient::new([r#"{"tool_calls": oops}"#, "fine"]));
        let mut record = InteractionRecord::from_user_message("hi");
        let out = run(llm, &mut record).await;
        assert_eq!(out.messages[1].role, Role::User);
        assert!(out.messages[1].content.contains("not valid JSON"));
        assert!(out.messages[1].is_recovery());
        assert_eq!(out.final_text(), "fine");
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let llm = Arc::new(ScriptedLlmClient::new(["never"]));
        let planner = Planner::new(llm, "system");
        let executor = executor();
        let recovery = RecoveryEngine::new();
        let token = CancellationToken::new();
        token.cancel();
        let session = ReactSession::new("agent", &planner, &executor, &recovery, token);
        let mut record = InteractionRecord::from_user_message("hi");
        let err = run_tool_loop(&session, &mut record).await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
    }
}
