//! Tool registry keyed by schema name, iterated in registration order.

use std::future::Future;
use std::sync::Arc;

use pcommon::Registry;
use pprovider::ToolSchema;
use serde_json::{Map, Value};

use crate::{FunctionTool, Tool, ToolError, ToolExecutionContext, Typed, TypedTool};

struct RegisteredTool {
    schema: ToolSchema,
    tool: Arc<dyn Tool>,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`ToolErrorKind::Duplicate`](crate::ToolErrorKind::Duplicate) if the name is taken.
    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let schema = tool.schema();
        if schema.name.trim().is_empty() {
            return Err(ToolError::invalid_arguments("tool name must not be empty"));
        }

        if self.tools.contains_key(&schema.name) {
            return Err(ToolError::duplicate(&schema.name));
        }

        self.tools
            .insert(schema.name.clone(), RegisteredTool { schema, tool });
        Ok(())
    }

    pub fn register_typed<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: TypedTool,
    {
        self.register(Typed(tool))
    }

    pub fn register_fn<F, Fut>(&mut self, schema: ToolSchema, handler: F) -> Result<(), ToolError>
    where
        F: Fn(Map<String, Value>, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(schema, handler))
    }

    pub fn register_sync_fn<F>(&mut self, schema: ToolSchema, handler: F) -> Result<(), ToolError>
    where
        F: Fn(Map<String, Value>, ToolExecutionContext) -> Result<Value, ToolError>
            + Send
            + Sync
            + 'static,
    {
        self.register_fn(schema, move |args, context| {
            let output = handler(args, context);
            async move { output }
        })
    }

    /// Fails with [`ToolErrorKind::NotFound`](crate::ToolErrorKind::NotFound) if absent.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.get(name).ok_or_else(|| ToolError::unknown_tool(name))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|entry| Arc::clone(&entry.tool))
    }

    pub fn schema(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.get(name).map(|entry| &entry.schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name).map(|entry| entry.tool)
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|entry| entry.schema.clone()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
