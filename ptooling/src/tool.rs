//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use pprovider::{ParamKind, ParameterSpec, ToolSchema};
//! use ptooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolSchema::new("echo", "Echoes input")
//!         .parameter(ParameterSpec::required("text", ParamKind::String, "Text to echo")),
//!     |args, _ctx| async move { Ok(serde_json::Value::Object(args)) },
//! );
//!
//! assert_eq!(tool.schema().name, "echo");
//! assert_eq!(tool.describe_call(&serde_json::Map::new()), "Executing echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use pcommon::BoxFuture;
use pprovider::ToolSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ToolError, ToolExecutionContext, parse_arguments};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub const DEFAULT_SUCCESS_SUMMARY: &str = "Completed successfully";

pub fn default_call_description(tool_name: &str) -> String {
    format!("Executing {tool_name}")
}

pub trait Tool: Send + Sync {
    fn schema(&self) -> ToolSchema;

    /// Receives arguments already validated against [`Tool::schema`], defaults applied.
    fn invoke<'a>(
        &'a self,
        args: &'a Map<String, Value>,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;

    fn describe_call(&self, _args: &Map<String, Value>) -> String {
        default_call_description(&self.schema().name)
    }

    fn summarize_success(&self, _output: &Value) -> String {
        DEFAULT_SUCCESS_SUMMARY.to_string()
    }
}

type ToolHandler = dyn Fn(Map<String, Value>, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    schema: ToolSchema,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(schema: ToolSchema, handler: F) -> Self
    where
        F: Fn(Map<String, Value>, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> = Arc::new(move |args, context| Box::pin(handler(args, context)));

        Self { schema, handler }
    }
}

impl Tool for FunctionTool {
    fn schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: &'a Map<String, Value>,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(args.clone(), context.clone())
    }
}

/// A tool whose arguments deserialize into a dedicated struct.
///
/// Register through [`ToolRegistry::register_typed`](crate::ToolRegistry::register_typed),
/// which wraps the tool in [`Typed`].
pub trait TypedTool: Send + Sync + 'static {
    type Args: DeserializeOwned + Send + Sync;

    fn schema(&self) -> ToolSchema;

    fn call<'a>(
        &'a self,
        args: Self::Args,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>>;

    fn describe(&self, _args: &Self::Args) -> Option<String> {
        None
    }

    fn summarize(&self, _output: &Value) -> String {
        DEFAULT_SUCCESS_SUMMARY.to_string()
    }
}

pub struct Typed<T>(pub T);

impl<T> Tool for Typed<T>
where
    T: TypedTool,
{
    fn schema(&self) -> ToolSchema {
        self.0.schema()
    }

    fn invoke<'a>(
        &'a self,
        args: &'a Map<String, Value>,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        match parse_arguments::<T::Args>(args) {
            Ok(parsed) => self.0.call(parsed, context),
            Err(error) => Box::pin(async move { Err(error) }),
        }
    }

    fn describe_call(&self, args: &Map<String, Value>) -> String {
        parse_arguments::<T::Args>(args)
            .ok()
            .and_then(|parsed| self.0.describe(&parsed))
            .unwrap_or_else(|| default_call_description(&self.0.schema().name))
    }

    fn summarize_success(&self, output: &Value) -> String {
        self.0.summarize(output)
    }
}
