//! Static tool catalog offered to the agent. Loaded once per process and
//! never mutated per game.

use std::sync::OnceLock;

use serde::Serialize;

pub const NAVIGATE_TOOL: &str = "navigate";

/// Argument the navigate tool takes; also the first key the validator's
/// extraction checks, so catalog and extraction agree on the common case.
pub const PAGE_TITLE_ARG: &str = "page_title";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: serde_json::Value,
}

pub fn catalog() -> &'static [ToolDescriptor] {
    static CATALOG: OnceLock<Vec<ToolDescriptor>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        vec![ToolDescriptor {
            name: NAVIGATE_TOOL,
            description: "Navigate to a page and get all available links on that page.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    PAGE_TITLE_ARG: {
                        "type": "string",
                        "description": "Page title to navigate to",
                    },
                },
                "required": [PAGE_TITLE_ARG],
            }),
        }]
    })
}

/// Exact-name lookup.
pub fn tool_by_name(name: &str) -> Option<&'static ToolDescriptor> {
    catalog().iter().find(|tool| tool.name == name)
}
