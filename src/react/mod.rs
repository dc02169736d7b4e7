//! 认知层：Planner、工具调用循环、过程事件

pub mod events;
pub mod loop_;
pub mod planner;

pub use events::ReactEvent;
pub use loop_::{run_tool_loop, LoopOutcome, ReactSession, BUDGET_EXHAUSTED_MESSAGE};
pub use planner::{parse_llm_output, Planner, PlannerOutput};
