//! 工具箱：音乐目录与发票的只读查询工具、噪声演示用的干扰工具，以及注册表与执行器

pub mod catalog;
pub mod descriptor;
pub mod distractors;
pub mod executor;
pub mod invoice;
pub mod registry;
pub mod schema;

pub use catalog::{music_tools, GENRE_SONG_LIMIT};
pub use descriptor::{ParamKind, ParamSpec, ToolArgs, ToolDescriptor};
pub use executor::ToolExecutor;
pub use invoice::invoice_tools;
pub use registry::{RegistryError, Tool, ToolRegistry};
pub use schema::tool_call_schema_json;
