//! 噪声智能体：没有主管、没有核验，一个工具循环同时挂着音乐目录工具与七个无关业务域的全部工具，
//! system prompt 拼接所有业务域的指令。用来观察超大工具表与冗长上下文对工具选择的干扰。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, InteractionRecord, RecoveryEngine};
use crate::db::Database;
use crate::llm::LlmClient;
use crate::react::{run_tool_loop, LoopOutcome, Planner, ReactEvent, ReactSession};
use crate::support::prompts::{memory_or_none, tool_protocol_section, MUSIC_CATALOG_INSTRUCTIONS};
use crate::tools::{distractors, music_tools, RegistryError, ToolExecutor, ToolRegistry};

pub const NOISY_AGENT: &str = "noisy_assistant";

/// 噪声智能体的角色提示：各业务域指令 + 音乐目录职责 + 已存偏好
pub fn noisy_prompt(loaded_memory: Option<&str>) -> String {
    let mut sections = vec![
        "You are a helpful assistant for a digital music store and its whole back office. \
You can help with HR, sales leads, community, documentation, product feedback, partners, vendors and the music catalog."
            .to_string(),
    ];
    for domain in distractors::domains() {
        sections.push(format!("## {}\n{}", domain.title, domain.instructions.trim()));
    }
    sections.push(format!("## Music Catalog\n{MUSIC_CATALOG_INSTRUCTIONS}"));
    sections.push(format!(
        "Prior saved user preferences: {}",
        memory_or_none(loaded_memory)
    ));
    sections.join("\n\n")
}

pub struct NoisyAgent {
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    recovery: RecoveryEngine,
    remaining_steps: usize,
}

impl NoisyAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        db: &Arc<Database>,
        tool_timeout_secs: u64,
        remaining_steps: usize,
    ) -> Result<Self, RegistryError> {
        let mut tools = music_tools(db);
        tools.extend(distractors::all_tools());
        let registry = ToolRegistry::from_tools(tools)?;
        Ok(Self {
            llm,
            executor: ToolExecutor::new(Arc::new(registry), tool_timeout_secs),
            recovery: RecoveryEngine::new(),
            remaining_steps,
        })
    }

    pub fn tool_count(&self) -> usize {
        self.executor.registry().len()
    }

    pub fn system_prompt(&self, record: &InteractionRecord) -> String {
        format!(
            "{}\n\n{}",
            noisy_prompt(record.loaded_memory()),
            tool_protocol_section(self.executor.registry())
        )
    }

    /// 跑一轮：重置步数预算，循环产生的全部消息并入记录
    pub async fn run(
        &self,
        record: &mut InteractionRecord,
        cancel_token: CancellationToken,
        event_tx: Option<&UnboundedSender<ReactEvent>>,
    ) -> Result<LoopOutcome, AgentError> {
        record.reset_step_budget(self.remaining_steps);
        let planner = Planner::new(self.llm.clone(), self.system_prompt(record));
        let session = ReactSession::new(NOISY_AGENT, &planner, &self.executor, &self.recovery, cancel_token)
            .with_event_tx(event_tx);
        let outcome = run_tool_loop(&session, record).await?;
        record.append_all(outcome.messages.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn agent() -> NoisyAgent {
        let db = Arc::new(Database::open_in_memory().unwrap());
        NoisyAgent::new(Arc::new(MockLlmClient::new()), &db, 5, 25).unwrap()
    }

    #[test]
    fn test_noisy_agent_carries_every_catalog() {
        let agent = agent();
        assert_eq!(agent.tool_count(), 4 + 61);
        let prompt = agent.system_prompt(&InteractionRecord::new());
        assert!(prompt.contains("## Vendor Management"));
        assert!(prompt.contains("\"approve_vendor_invoice\""));
        assert!(prompt.contains("Prior saved user preferences: None"));
    }

    #[tokio::test]
    async fn test_noisy_agent_appends_whole_loop() {
        let agent = agent();
        let mut record = InteractionRecord::from_user_message("Recommend me some blues");
        let out = agent.run(&mut record, CancellationToken::new(), None).await.unwrap();
        assert_eq!(record.messages().len(), 1 + out.messages.len());
        assert!(out.final_text().contains("Eric Clapton"));
        assert_eq!(record.remaining_steps(), Some(23));
    }
}
