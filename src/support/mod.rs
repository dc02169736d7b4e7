//! 音乐商店客服：身份核验、主管路由、子智能体、噪声演示智能体与主流程

pub mod identity;
pub mod noisy;
pub mod pipeline;
pub mod prompts;
pub mod subagents;
pub mod supervisor;
pub mod verify;

pub use identity::{CustomerDirectory, Identifier, IdentityResolver, SqliteCustomerDirectory};
pub use noisy::NoisyAgent;
pub use pipeline::{build_support_graph, SupportAssistant, TurnOutcome};
pub use subagents::{
    invoice_subagent, music_catalog_subagent, AgentRuntime, SubAgent, INVOICE_AGENT, MUSIC_CATALOG_AGENT,
};
pub use supervisor::{RoutingDecision, Supervisor};
pub use verify::{VerificationGate, VerifyOutcome};
