//! Builtin health-assistant tool catalog.
//!
//! Every builtin has a fixed schema, a start description, and a success summary.
//! `generate_health_plan` ships an implementation; the other executors come from the host
//! through [`BuiltinTool::with_handler`].
//!
//! ```rust
//! use ptooling::{BuiltinTool, Tool, ToolRegistry};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register(BuiltinTool::SearchWeb.with_handler(|_args, _ctx| async move {
//!         Ok(json!({"results": []}))
//!     }))
//!     .expect("search registers");
//!
//! let tool = registry.resolve("search_web").expect("registered");
//! let args = json!({"query": "zone 2 cardio"}).as_object().cloned().expect("object");
//! assert_eq!(tool.describe_call(&args), "Searching the web for: zone 2 cardio");
//! ```

use std::future::Future;
use std::sync::Arc;

use pprovider::{ParamKind, ParameterSpec, ToolSchema};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{Tool, ToolError, ToolExecutionContext, ToolFuture, TypedTool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTool {
    SearchWeb,
    ReadDocuments,
    AnalyzeUserHealthData,
    GenerateHealthPlan,
}

impl BuiltinTool {
    pub const ALL: [BuiltinTool; 4] = [
        Self::SearchWeb,
        Self::ReadDocuments,
        Self::AnalyzeUserHealthData,
        Self::GenerateHealthPlan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SearchWeb => "search_web",
            Self::ReadDocuments => "read_documents",
            Self::AnalyzeUserHealthData => "analyze_user_health_data",
            Self::GenerateHealthPlan => "generate_health_plan",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn schema(self) -> ToolSchema {
        match self {
            Self::SearchWeb => ToolSchema::new(
                self.name(),
                "Search the internet for current health, fitness, and medical information",
            )
            .parameter(ParameterSpec::required(
                "query",
                ParamKind::String,
                "Search query for health/fitness information",
            ))
            .parameter(
                ParameterSpec::optional("focus_area", ParamKind::String, "Specific health domain to focus on")
                    .with_allowed(["health", "fitness", "nutrition", "medical", "general"]),
            )
            .parameter(
                ParameterSpec::optional("num_results", ParamKind::Integer, "Number of search results to return")
                    .with_default(json!(5)),
            ),
            Self::ReadDocuments => ToolSchema::new(
                self.name(),
                "Read and analyze documents from specified folders (research papers, guides, etc.)",
            )
            .parameter(ParameterSpec::required(
                "folder_path",
                ParamKind::String,
                "Path to folder containing documents",
            ))
            .parameter(
                ParameterSpec::optional("file_types", ParamKind::Array, "File types to include")
                    .with_items(ParamKind::String)
                    .with_default(json!(["pdf", "docx", "txt"])),
            )
            .parameter(
                ParameterSpec::optional("search_terms", ParamKind::Array, "Specific terms to look for in documents")
                    .with_items(ParamKind::String),
            ),
            Self::AnalyzeUserHealthData => ToolSchema::new(
                self.name(),
                "Analyze the user's personal health and fitness data from the application database",
            )
            .parameter(ParameterSpec::required("user_id", ParamKind::Integer, "User ID to analyze"))
            .parameter(
                ParameterSpec::required("data_types", ParamKind::Array, "Types of data to analyze")
                    .with_item_allowed(
                        ParamKind::String,
                        ["activities", "diet", "weight", "goals", "all"],
                    ),
            )
            .parameter(ParameterSpec::optional(
                "date_range",
                ParamKind::String,
                "Date range for analysis (e.g., 'last_30_days', 'last_week')",
            ))
            .parameter(
                ParameterSpec::optional("analysis_type", ParamKind::String, "Type of analysis to perform")
                    .with_allowed(["trends", "summary", "detailed", "patterns"])
                    .with_default(json!("summary")),
            ),
            Self::GenerateHealthPlan => ToolSchema::new(
                self.name(),
                "Generate personalized health/fitness plans based on user data and research",
            )
            .parameter(
                ParameterSpec::required("plan_type", ParamKind::String, "Type of plan to generate")
                    .with_allowed(["workout", "diet", "weight_loss", "muscle_gain", "general_health"]),
            )
            .parameter(ParameterSpec::optional(
                "user_data",
                ParamKind::Object,
                "User's current health data",
            ))
            .parameter(ParameterSpec::optional(
                "research_data",
                ParamKind::Object,
                "Relevant research findings",
            ))
            .parameter(
                ParameterSpec::optional("duration", ParamKind::String, "Plan duration")
                    .with_default(json!("4_weeks")),
            ),
        }
    }

    pub fn describe(self, args: &Map<String, Value>) -> String {
        let text = |key: &str, fallback: &str| {
            args.get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        match self {
            Self::SearchWeb => {
                format!("Searching the web for: {}", text("query", "health information"))
            }
            Self::ReadDocuments => {
                format!("Reading documents from: {}", text("folder_path", "specified folder"))
            }
            Self::AnalyzeUserHealthData => {
                let data_types = args
                    .get("data_types")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_str).collect::<Vec<_>>())
                    .filter(|items| !items.is_empty())
                    .unwrap_or_else(|| vec!["health data"]);
                format!("Analyzing your {}", data_types.join(", "))
            }
            Self::GenerateHealthPlan => {
                format!("Creating a {} plan for you", text("plan_type", "health"))
            }
        }
    }

    pub fn success_summary(self) -> &'static str {
        match self {
            Self::SearchWeb => "Found relevant health information",
            Self::ReadDocuments => "Analyzed documents successfully",
            Self::AnalyzeUserHealthData => "Completed health data analysis",
            Self::GenerateHealthPlan => "Generated personalized plan",
        }
    }

    /// Binds a host-supplied executor to this catalog entry.
    pub fn with_handler<F, Fut>(self, handler: F) -> HostedTool
    where
        F: Fn(Map<String, Value>, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<HostedHandler> = Arc::new(move |args, context| Box::pin(handler(args, context)));
        HostedTool {
            builtin: self,
            schema: self.schema(),
            handler,
        }
    }
}

type HostedHandler = dyn Fn(Map<String, Value>, ToolExecutionContext) -> ToolFuture<'static, Result<Value, ToolError>>
    + Send
    + Sync;

pub struct HostedTool {
    builtin: BuiltinTool,
    schema: ToolSchema,
    handler: Arc<HostedHandler>,
}

impl HostedTool {
    pub fn builtin(&self) -> BuiltinTool {
        self.builtin
    }
}

impl Tool for HostedTool {
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

    fn describe_call(&self, args: &Map<String, Value>) -> String {
        self.builtin.describe(args)
    }

    fn summarize_success(&self, _output: &Value) -> String {
        self.builtin.success_summary().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchWebArgs {
    pub query: String,
    pub focus_area: Option<String>,
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

fn default_num_results() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadDocumentsArgs {
    pub folder_path: String,
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub search_terms: Vec<String>,
}

fn default_file_types() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeUserHealthDataArgs {
    pub user_id: i64,
    pub data_types: Vec<String>,
    pub date_range: Option<String>,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

fn default_analysis_type() -> String {
    "summary".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateHealthPlanArgs {
    pub plan_type: String,
    #[serde(default)]
    pub user_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub research_data: Option<Map<String, Value>>,
    #[serde(default = "default_duration")]
    pub duration: String,
}

fn default_duration() -> String {
    "4_weeks".to_string()
}

/// Deterministic plan generator for `generate_health_plan`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenerateHealthPlanTool;

impl TypedTool for GenerateHealthPlanTool {
    type Args = GenerateHealthPlanArgs;

    fn schema(&self) -> ToolSchema {
        BuiltinTool::GenerateHealthPlan.schema()
    }

    fn call<'a>(
        &'a self,
        args: Self::Args,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<Value, ToolError>> {
        Box::pin(async move {
            let has_data = |data: &Option<Map<String, Value>>| {
                data.as_ref().is_some_and(|entries| !entries.is_empty())
            };

            Ok(json!({
                "plan_type": args.plan_type,
                "duration": args.duration,
                "generated": true,
                "recommendations": format!("Generated {} plan for {}", args.plan_type, args.duration),
                "user_data_incorporated": has_data(&args.user_data),
                "research_based": has_data(&args.research_data),
            }))
        })
    }

    fn describe(&self, args: &Self::Args) -> Option<String> {
        Some(format!("Creating a {} plan for you", args.plan_type))
    }

    fn summarize(&self, _output: &Value) -> String {
        BuiltinTool::GenerateHealthPlan.success_summary().to_string()
    }
}
