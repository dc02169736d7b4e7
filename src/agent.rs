//! 组装入口
//!
//! 供命令行（以及将来的 HTTP 前端）使用的无界面装配逻辑：
//! create_support_assistant 按配置打开数据库、选择 LLM、构建子智能体 / 主管 / 核验门 / 流程引擎；
//! create_noisy_agent 构建挂满干扰工具的单智能体演示。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::db::Database;
use crate::llm::{create_llm_from_config, LlmClient};
use crate::memory::{MemoryStoreAdapter, SqliteCheckpointStore, SqliteProfileStore};
use crate::react::ReactEvent;
use crate::support::{
    build_support_graph, invoice_subagent, music_catalog_subagent, AgentRuntime, IdentityResolver,
    NoisyAgent, SqliteCustomerDirectory, SupportAssistant, Supervisor, VerificationGate,
};
use crate::workflow::WorkflowEngine;

/// 按配置打开数据库（内存库或 data_dir 下的文件）
pub fn open_database(cfg: &AppConfig) -> Result<Arc<Database>, AgentError> {
    let path = cfg.store.database_path(&cfg.app.data_dir());
    let db = Database::open(path.as_deref(), cfg.store.seed_demo_data)?;
    tracing::info!(database = ?path, "store opened");
    Ok(Arc::new(db))
}

/// 用给定的 LLM 与数据库装配客服助手
pub fn assemble_support_assistant(
    cfg: &AppConfig,
    llm: Arc<dyn LlmClient>,
    db: Arc<Database>,
    event_tx: Option<UnboundedSender<ReactEvent>>,
) -> Result<SupportAssistant, AgentError> {
    let timeout = cfg.tools.tool_timeout_secs;
    let agents = vec![
        music_catalog_subagent(llm.clone(), &db, timeout)?,
        invoice_subagent(llm.clone(), &db, timeout)?,
    ];
    let supervisor = Arc::new(Supervisor::new(llm.clone(), agents, cfg.agent.output_mode)?);

    let resolver = IdentityResolver::new(Arc::new(SqliteCustomerDirectory::new(db.clone())));
    let gate = Arc::new(VerificationGate::new(llm.clone(), resolver));
    let memory = Arc::new(MemoryStoreAdapter::new(
        Arc::new(SqliteProfileStore::new(db.clone())),
        llm,
    ));

    let mut runtime = AgentRuntime::new(cfg.agent.remaining_steps);
    if let Some(tx) = event_tx {
        runtime = runtime.with_event_tx(tx);
    }
    let runtime = Arc::new(runtime);

    let graph = build_support_graph(gate, memory, supervisor, runtime.clone())?;
    let engine = WorkflowEngine::new(
        Arc::new(graph),
        Arc::new(SqliteCheckpointStore::new(db)),
        cfg.agent.max_graph_iterations,
    );
    Ok(SupportAssistant::new(engine, runtime))
}

/// 从配置装配完整客服助手
pub fn create_support_assistant(
    cfg: &AppConfig,
    event_tx: Option<UnboundedSender<ReactEvent>>,
) -> Result<SupportAssistant, AgentError> {
    let db = open_database(cfg)?;
    let llm = create_llm_from_config(cfg);
    assemble_support_assistant(cfg, llm, db, event_tx)
}

/// 噪声演示智能体与其画像存储（按 customer 预载偏好时使用）
pub struct NoisyComponents {
    pub agent: NoisyAgent,
    pub memory: MemoryStoreAdapter,
}

pub fn create_noisy_agent(cfg: &AppConfig) -> Result<NoisyComponents, AgentError> {
    let db = open_database(cfg)?;
    let llm = create_llm_from_config(cfg);
    let agent = NoisyAgent::new(
        llm.clone(),
        &db,
        cfg.tools.tool_timeout_secs,
        cfg.agent.remaining_steps,
    )?;
    let memory = MemoryStoreAdapter::new(Arc::new(SqliteProfileStore::new(db)), llm);
    Ok(NoisyComponents { agent, memory })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_assembles_offline() {
        let cfg = AppConfig::default();
        let assistant = create_support_assistant(&cfg, None).unwrap();
        let out = assistant.send("t1", "hello").await.unwrap();
        assert!(!out.text().is_empty());
        let noisy = create_noisy_agent(&cfg).unwrap();
        assert_eq!(noisy.agent.tool_count(), 65);
    }
}
