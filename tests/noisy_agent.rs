//! 噪声智能体集成测试：大工具表下的工具选择、偏好预载、步数预算

use std::sync::Arc;

use cadence::agent::create_noisy_agent;
use cadence::config::AppConfig;
use cadence::core::InteractionRecord;
use cadence::db::Database;
use cadence::llm::MockLlmClient;
use cadence::memory::{InMemoryProfileStore, MemoryStoreAdapter, Message};
use cadence::react::{ReactEvent, BUDGET_EXHAUSTED_MESSAGE};
use cadence::support::NoisyAgent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_picks_catalog_tool_among_distractors() {
    let components = create_noisy_agent(&AppConfig::default()).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut record = InteractionRecord::from_user_message("Can you recommend some jazz?");
    let outcome = components
        .agent
        .run(&mut record, CancellationToken::new(), Some(&tx))
        .await
        .unwrap();
    drop(tx);

    assert!(!outcome.exhausted);
    assert!(outcome.final_text().starts_with("Here is what I found using get_songs_by_genre"));
    let mut tools = Vec::new();
    while let Some(ev) = rx.recv().await {
        if let ReactEvent::ToolCall { tool, .. } = ev {
            tools.push(tool);
        }
    }
    assert_eq!(tools, vec!["get_songs_by_genre".to_string()]);
    assert_eq!(record.messages().len(), 4);
}

#[tokio::test]
async fn test_saved_preferences_reach_the_prompt() {
    let llm = Arc::new(MockLlmClient::new());
    let memory = MemoryStoreAdapter::new(Arc::new(InMemoryProfileStore::new()), llm.clone());
    memory
        .save("7", "user: I really like rock and blues")
        .await
        .unwrap();

    let db = Arc::new(Database::open_in_memory().unwrap());
    let agent = NoisyAgent::new(llm, &db, 5, 25).unwrap();
    let mut record = InteractionRecord::from_user_message("hi");
    record.set_actor_id("7").unwrap();
    record.set_loaded_memory(memory.load("7").await.unwrap()).unwrap();

    let prompt = agent.system_prompt(&record);
    assert!(prompt.contains("Prior saved user preferences: Music Preferences: rock, blues"));
    assert!(prompt.contains("## Music Catalog"));
}

#[tokio::test]
async fn test_budget_is_reset_per_turn_and_enforced() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let agent = NoisyAgent::new(Arc::new(MockLlmClient::new()), &db, 5, 1).unwrap();

    let mut record = InteractionRecord::from_user_message("Any blues?");
    let outcome = agent.run(&mut record, CancellationToken::new(), None).await.unwrap();
    assert!(outcome.exhausted);
    assert_eq!(outcome.final_text(), BUDGET_EXHAUSTED_MESSAGE);

    record.append(Message::user("What about albums by Queen?"));
    let outcome = agent.run(&mut record, CancellationToken::new(), None).await.unwrap();
    assert!(outcome.exhausted);
    assert_eq!(record.remaining_steps(), Some(0));
}
