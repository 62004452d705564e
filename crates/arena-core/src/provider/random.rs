//! Baseline provider: picks a uniformly random link from the current
//! page. Useful as a floor for ratings and as a dependency-free way to
//! exercise a full game.

use std::future::Future;
use std::pin::Pin;

use crate::engine::tools::{NAVIGATE_TOOL, PAGE_TITLE_ARG, ToolDescriptor};
use crate::models::{GameState, JsonMap, ToolCall};

use super::LanguageModel;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomModel;

impl LanguageModel for RandomModel {
    fn generate_response<'a>(
        &'a self,
        tools: &'a [ToolDescriptor],
        state: &'a GameState,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolCall>> + Send + 'a>> {
        Box::pin(async move {
            if !tools.iter().any(|tool| tool.name == NAVIGATE_TOOL) {
                return Ok(ToolCall {
                    raw_text: Some(format!("tool '{NAVIGATE_TOOL}' is not available")),
                    ..ToolCall::default()
                });
            }

            let links = state
                .current_page
                .as_ref()
                .map(|page| page.links.as_slice())
                .unwrap_or_default();
            if links.is_empty() {
                return Ok(ToolCall {
                    raw_text: Some("no links available on the current page".to_string()),
                    ..ToolCall::default()
                });
            }

            let link = links[rand::random_range(0..links.len())].clone();
            let mut arguments = JsonMap::new();
            arguments.insert(PAGE_TITLE_ARG.into(), link.clone().into());
            Ok(ToolCall {
                raw_text: Some(format!("randomly selected link: {link}")),
                name: Some(NAVIGATE_TOOL.to_string()),
                arguments: Some(arguments),
                metrics: None,
            })
        })
    }
}
