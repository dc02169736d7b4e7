//! 核心层：错误与恢复、交互记录

pub mod error;
pub mod recovery;
pub mod state;

pub use error::{AgentError, RecoveryAction, StoreError};
pub use recovery::RecoveryEngine;
pub use state::InteractionRecord;
