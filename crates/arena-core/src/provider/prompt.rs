//! Prompt rendering for providers that take a single text prompt.

use crate::engine::tools::ToolDescriptor;
use crate::models::{GameConfig, GameState};

use super::wire::{TOOL_CALL_END, TOOL_CALL_START};

/// Fills the config's system prompt template. The template carries
/// `{start_page_title}` / `{target_page_title}` placeholders.
pub fn render_system_prompt(config: &GameConfig) -> String {
    config
        .system_prompt_template
        .replace("{start_page_title}", &config.start_page_title)
        .replace("{target_page_title}", &config.target_page_title)
}

/// Builds the full turn prompt: system section, current page and links,
/// tool list, and the single-block output contract.
pub fn build_turn_prompt(state: &GameState, tools: &[ToolDescriptor]) -> String {
    let mut prompt = render_system_prompt(&state.config);
    prompt.push('\n');

    if let Some(page) = &state.current_page {
        prompt.push_str(&format!("You are currently on the page '{}'.\n", page.title));
        prompt.push_str("Here are the available links:\n");
        for link in &page.links {
            prompt.push_str(link);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nAvailable tools:\n");
    for tool in tools {
        prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }

    prompt.push_str(&format!(
        "\nRespond with exactly one {TOOL_CALL_START}{{\"name\": \"...\", \"arguments\": {{...}}}}{TOOL_CALL_END} block and nothing else.\n"
    ));
    prompt
}
