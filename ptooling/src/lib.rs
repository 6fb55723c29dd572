//! Capability layer for registering, validating, and executing tools.

mod args;
mod catalog;
mod deadline;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        BuiltinTool, DefaultToolRuntime, PreparedCall, Tool, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
        ToolRuntimeHooks, TypedTool,
    };
}

pub use args::{parse_arguments, required_string, validate_arguments};
pub use catalog::{
    AnalyzeUserHealthDataArgs, BuiltinTool, GenerateHealthPlanArgs, GenerateHealthPlanTool,
    HostedTool, ReadDocumentsArgs, SearchWebArgs,
};
pub use deadline::with_deadline;
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, PreparedCall, ToolRuntime};
pub use tool::{
    DEFAULT_SUCCESS_SUMMARY, FunctionTool, Tool, ToolFuture, Typed, TypedTool,
    default_call_description,
};
pub use types::{ToolExecutionContext, ToolExecutionResult};
