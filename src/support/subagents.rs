//! 子智能体：音乐目录与发票查询，各自是一个带专属工具集的有界工具循环

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::core::{AgentError, InteractionRecord, RecoveryEngine};
use crate::db::Database;
use crate::llm::LlmClient;
use crate::react::{run_tool_loop, LoopOutcome, Planner, ReactEvent, ReactSession};
use crate::support::prompts::{music_catalog_prompt, tool_protocol_section, INVOICE_PROMPT};
use crate::tools::{invoice_tools, music_tools, RegistryError, ToolExecutor, ToolRegistry};

pub const MUSIC_CATALOG_AGENT: &str = "music_catalog_information_subagent";
pub const INVOICE_AGENT: &str = "invoice_information_subagent";

/// 一次会话运行期间各智能体共享的运行时
#[derive(Debug, Clone, Default)]
pub struct AgentRuntime {
    pub recovery: RecoveryEngine,
    pub cancel_token: CancellationToken,
    pub event_tx: Option<UnboundedSender<ReactEvent>>,
    /// 每次委派开始时重置的步数预算
    pub remaining_steps: usize,
}

impl AgentRuntime {
    pub fn new(remaining_steps: usize) -> Self {
        Self {
            remaining_steps,
            ..Default::default()
        }
    }

    pub fn with_event_tx(mut self, tx: UnboundedSender<ReactEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }
}

/// 根据交互记录生成子智能体的角色提示（不含工具段）
pub type PromptBuilder = fn(&InteractionRecord) -> String;

pub struct SubAgent {
    name: String,
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    build_prompt: PromptBuilder,
}

impl SubAgent {
    pub fn new(
        name: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        executor: ToolExecutor,
        build_prompt: PromptBuilder,
    ) -> Self {
        Self {
            name: name.into(),
            llm,
            executor,
            build_prompt,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.executor.tool_names()
    }

    pub fn system_prompt(&self, record: &InteractionRecord) -> String {
        format!(
            "{}\n\n{}",
            (self.build_prompt)(record),
            tool_protocol_section(self.executor.registry())
        )
    }

    /// 运行一次工具循环，返回本次新产生的消息
    pub async fn run(
        &self,
        record: &mut InteractionRecord,
        runtime: &AgentRuntime,
    ) -> Result<LoopOutcome, AgentError> {
        let planner = Planner::new(self.llm.clone(), self.system_prompt(record));
        let session = ReactSession::new(
            &self.name,
            &planner,
            &self.executor,
            &runtime.recovery,
            runtime.cancel_token.clone(),
        )
        .with_event_tx(runtime.event_tx.as_ref());
        run_tool_loop(&session, record).await
    }
}

fn music_prompt(record: &InteractionRecord) -> String {
    music_catalog_prompt(record.loaded_memory())
}

fn invoice_prompt(_record: &InteractionRecord) -> String {
    INVOICE_PROMPT.to_string()
}

pub fn music_catalog_subagent(
    llm: Arc<dyn LlmClient>,
    db: &Arc<Database>,
    tool_timeout_secs: u64,
) -> Result<SubAgent, RegistryError> {
    let registry = ToolRegistry::from_tools(music_tools(db))?;
    Ok(SubAgent::new(
        MUSIC_CATALOG_AGENT,
        llm,
        ToolExecutor::new(Arc::new(registry), tool_timeout_secs),
        music_prompt,
    ))
}

pub fn invoice_subagent(
    llm: Arc<dyn LlmClient>,
    db: &Arc<Database>,
    tool_timeout_secs: u64,
) -> Result<SubAgent, RegistryError> {
    let registry = ToolRegistry::from_tools(invoice_tools(db))?;
    Ok(SubAgent::new(
        INVOICE_AGENT,
        llm,
        ToolExecutor::new(Arc::new(registry), tool_timeout_secs),
        invoice_prompt,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::memory::Message;

    fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_music_prompt_carries_memory_and_tools() {
        let agent = music_catalog_subagent(Arc::new(MockLlmClient::new()), &db(), 5).unwrap();
        let mut record = InteractionRecord::from_user_message("hi");
        assert!(agent.system_prompt(&record).contains("Prior saved user preferences: None"));
        record.set_actor_id("60").unwrap();
        record.set_loaded_memory("Music Preferences: jazz").unwrap();
        let prompt = agent.system_prompt(&record);
        assert!(prompt.contains("Prior saved user preferences: Music Preferences: jazz"));
        assert!(prompt.contains("\"get_songs_by_genre\""));
        assert!(!prompt.contains("transfer_to_"));
    }

    #[test]
    fn test_runtime_clones_share_cancellation() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let runtime = AgentRuntime::new(7).with_event_tx(tx);
        let copy = runtime.clone();
        assert_eq!(copy.remaining_steps, 7);
        assert!(copy.event_tx.is_some());
        runtime.cancel_token.cancel();
        assert!(copy.cancel_token.is_cancelled());
    }

    #[tokio::test]
    async fn test_music_agent_answers_from_the_catalog() {
        let agent = music_catalog_subagent(Arc::new(MockLlmClient::new()), &db(), 5).unwrap();
        let mut record = InteractionRecord::from_user_message("What albums do you have by AC/DC?");
        record.reset_step_budget(10);
        let out = agent.run(&mut record, &AgentRuntime::new(10)).await.unwrap();
        assert!(!out.exhausted);
        assert_eq!(out.messages.len(), 3);
        assert!(out.final_text().contains("Let There Be Rock"));
        assert_eq!(out.messages[2].name.as_deref(), Some(MUSIC_CATALOG_AGENT));
    }

    #[tokio::test]
    async fn test_invoice_agent_uses_verified_customer_id() {
        let agent = invoice_subagent(Arc::new(MockLlmClient::new()), &db(), 5).unwrap();
        let mut record = InteractionRecord::from_user_message("What was my most recent invoice?");
        record.append(Message::system(
            "Thank you for providing your information! I was able to verify your account with customer id 60.",
        ));
        let out = agent.run(&mut record, &AgentRuntime::new(10)).await.unwrap();
        assert_eq!(out.messages[0].tool_calls[0].tool, "get_invoices_by_customer_sorted_by_date");
        assert!(out.final_text().contains("\"InvoiceId\":6"));
    }
}
