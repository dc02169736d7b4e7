//! 图工作流：节点、固定边与条件边、中断/恢复、逐步检查点

pub mod builder;
pub mod engine;
pub mod graph;
pub mod types;

pub use builder::WorkflowBuilder;
pub use engine::WorkflowEngine;
pub use graph::WorkflowGraph;
pub use types::*;
