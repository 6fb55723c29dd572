//! Prompt construction for the first user turn of a round.
//!
//! ```rust
//! use pagent::{UserContext, build_context_prompt};
//! use pprovider::ToolSchema;
//!
//! let schemas = vec![ToolSchema::new("search_web", "Find current research")];
//! let context = UserContext::new("42").with_fact("Current Goals", "Lose 5kg");
//! let prompt = build_context_prompt("How much protein?", Some(&context), &schemas);
//!
//! assert!(prompt.contains("User Question: How much protein?"));
//! assert!(prompt.contains("- Current Goals: Lose 5kg"));
//! assert!(prompt.contains("1. search_web - Find current research"));
//! ```

use std::fmt::Write;

use pprovider::ToolSchema;

use crate::UserContext;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a health and fitness question answering agent. \
Answer with evidence-based, personalized guidance and use the available tools when they help.";

const PROMPT_PREAMBLE: &str = "You are a health and fitness question answering agent integrated into a health tracker application.";

const INSTRUCTIONS: &[&str] = &[
    "Use multiple tools in parallel when beneficial (e.g., search web while analyzing user data)",
    "Chain tools logically (gather data first, then analyze and synthesize)",
    "Always consider both user-specific data AND current research/best practices",
    "Provide evidence-based recommendations with sources when possible",
    "If user data is relevant to the question, always analyze it",
    "For complex questions, break down your approach into clear reasoning steps",
];

const CLOSING: &str = "Please analyze this question and use the appropriate tools to provide a comprehensive, personalized answer.";

pub fn build_context_prompt(
    question: &str,
    user_context: Option<&UserContext>,
    schemas: &[ToolSchema],
) -> String {
    let mut prompt = String::new();
    let _ = write!(prompt, "{PROMPT_PREAMBLE}\n\nUser Question: {question}\n\n");

    if let Some(context) = user_context {
        prompt.push_str("User Context:\n");
        let _ = writeln!(prompt, "- User ID: {}", context.user_id);
        if let Some(name) = &context.display_name {
            let _ = writeln!(prompt, "- Name: {name}");
        }
        for (label, value) in &context.facts {
            let _ = writeln!(prompt, "- {label}: {value}");
        }
        prompt.push('\n');
    }

    if !schemas.is_empty() {
        prompt.push_str(
            "Available Tools:\nYou have access to several powerful tools that you can use in parallel:\n\n",
        );
        for (position, schema) in schemas.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. {} - {}",
                position + 1,
                schema.name,
                schema.description
            );
        }
        prompt.push('\n');
    }

    prompt.push_str("Instructions:\n");
    for instruction in INSTRUCTIONS {
        let _ = writeln!(prompt, "- {instruction}");
    }
    prompt.push('\n');
    prompt.push_str(CLOSING);
    prompt
}
