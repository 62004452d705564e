//! Pure, synchronous checks on the agent's proposed action. Each stage
//! returns the `GameError` that should terminate the game when it fails;
//! none of them touch game state.

use crate::models::{ErrorKind, GameError, JsonMap, Page, ToolCall};

use super::tools::ToolDescriptor;

/// Argument keys searched for the target page title, highest priority
/// first. This order is a compatibility contract with agents that use
/// inconsistent tool-calling conventions; do not reorder.
const TITLE_KEYS: [&str; 3] = ["page_title", "page", "title"];

/// Stage (a): the call must name a tool, and the name must match a catalog
/// entry exactly.
pub fn validate_structure(call: &ToolCall, tools: &[ToolDescriptor]) -> Result<(), GameError> {
    let Some(name) = call.name.as_deref().filter(|n| !n.is_empty()) else {
        let mut metadata = JsonMap::new();
        metadata.insert("model_response".into(), call.raw_text.clone().into());
        return Err(GameError::with_metadata(
            ErrorKind::ModelNoToolCall,
            "language model did not select a valid action",
            metadata,
        ));
    };

    if !tools.iter().any(|tool| tool.name == name) {
        let mut metadata = JsonMap::new();
        metadata.insert("requested_tool".into(), name.into());
        metadata.insert(
            "available_tools".into(),
            tools
                .iter()
                .map(|tool| serde_json::Value::from(tool.name))
                .collect::<Vec<_>>()
                .into(),
        );
        return Err(GameError::with_metadata(
            ErrorKind::ModelInvalidTool,
            format!("model requested unavailable tool: {name}"),
            metadata,
        ));
    }

    Ok(())
}

/// Stage (b): pull the target page title out of the argument map. Known
/// keys win in priority order, then the first textual argument value is
/// taken as a fallback. Empty strings count as missing.
pub fn extract_target_title(call: &ToolCall) -> Result<String, GameError> {
    let empty = JsonMap::new();
    let args = call.arguments.as_ref().unwrap_or(&empty);

    let from_known_key = TITLE_KEYS
        .iter()
        .find_map(|key| args.get(*key).and_then(|v| v.as_str()));
    let target = from_known_key
        .or_else(|| args.values().find_map(|v| v.as_str()))
        .filter(|s| !s.is_empty());

    match target {
        Some(title) => Ok(title.to_string()),
        None => {
            let mut metadata = JsonMap::new();
            metadata.insert("tool_name".into(), call.name.clone().into());
            metadata.insert(
                "arguments".into(),
                serde_json::Value::Object(args.clone()),
            );
            metadata.insert(
                "expected_params".into(),
                TITLE_KEYS
                    .iter()
                    .map(|k| serde_json::Value::from(*k))
                    .collect::<Vec<_>>()
                    .into(),
            );
            Err(GameError::with_metadata(
                ErrorKind::ModelInvalidTool,
                format!(
                    "tool '{}' called without a page title argument",
                    call.name.as_deref().unwrap_or("")
                ),
                metadata,
            ))
        }
    }
}

/// Stage (c): exact, case-sensitive membership in the current page's
/// outgoing links. The metadata records whether the illegal request was
/// the configured win target, for post-hoc analysis of agents that "see"
/// the goal but cannot reach it.
pub fn validate_link(
    target: &str,
    current_page: &Page,
    win_target_title: &str,
    call: &ToolCall,
) -> Result<(), GameError> {
    if current_page.links.iter().any(|link| link == target) {
        return Ok(());
    }

    let mut metadata = JsonMap::new();
    metadata.insert("requested_page".into(), target.into());
    metadata.insert("current_page".into(), current_page.title.clone().into());
    metadata.insert(
        "is_target_page".into(),
        (target == win_target_title).into(),
    );
    metadata.insert(
        "available_links_count".into(),
        current_page.links.len().into(),
    );
    if let Some(attempt) = call.attempt()
        && let Ok(v) = serde_json::to_value(attempt)
    {
        metadata.insert("tool_call".into(), v);
    }

    Err(GameError::with_metadata(
        ErrorKind::ModelInvalidLink,
        format!(
            "page '{target}' is not in available links of '{}'",
            current_page.title
        ),
        metadata,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tools::catalog;

    fn call_with_args(args: serde_json::Value) -> ToolCall {
        let serde_json::Value::Object(map) = args else {
            panic!("args must be an object");
        };
        ToolCall {
            raw_text: None,
            name: Some("navigate".to_string()),
            arguments: Some(map),
            metrics: None,
        }
    }

    fn page(title: &str, links: &[&str]) -> Page {
        Page {
            title: title.to_string(),
            url: format!("https://example.org/{title}"),
            text: None,
            links: links.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn missing_name_is_no_tool_call() {
        let call = ToolCall::default();
        let err = validate_structure(&call, catalog()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelNoToolCall);
    }

    #[test]
    fn empty_name_is_no_tool_call() {
        let call = ToolCall {
            name: Some(String::new()),
            ..ToolCall::default()
        };
        let err = validate_structure(&call, catalog()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelNoToolCall);
    }

    #[test]
    fn unknown_name_is_invalid_tool() {
        let call = ToolCall {
            name: Some("teleport".to_string()),
            ..ToolCall::default()
        };
        let err = validate_structure(&call, catalog()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelInvalidTool);
        assert_eq!(err.metadata["requested_tool"], serde_json::json!("teleport"));
    }

    #[test]
    fn extraction_prefers_page_title_key() {
        let call = call_with_args(serde_json::json!({
            "title": "B",
            "page": "C",
            "page_title": "A",
        }));
        assert_eq!(extract_target_title(&call).unwrap(), "A");
    }

    #[test]
    fn extraction_page_beats_title() {
        let call = call_with_args(serde_json::json!({"page": "C", "title": "B"}));
        assert_eq!(extract_target_title(&call).unwrap(), "C");
    }

    #[test]
    fn extraction_falls_back_to_first_string_value() {
        let call = call_with_args(serde_json::json!({"count": 3, "destination": "Mars"}));
        assert_eq!(extract_target_title(&call).unwrap(), "Mars");
    }

    #[test]
    fn extraction_rejects_empty_and_missing() {
        let call = call_with_args(serde_json::json!({"page_title": ""}));
        let err = extract_target_title(&call).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelInvalidTool);

        let call = ToolCall {
            name: Some("navigate".to_string()),
            ..ToolCall::default()
        };
        let err = extract_target_title(&call).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelInvalidTool);
    }

    #[test]
    fn link_check_is_case_sensitive() {
        let page = page("A", &["Mars"]);
        let call = call_with_args(serde_json::json!({"page_title": "mars"}));
        let err = validate_link("mars", &page, "Mars", &call).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelInvalidLink);
    }

    #[test]
    fn illegal_link_records_whether_it_was_the_goal() {
        let page = page("A", &["B"]);
        let call = call_with_args(serde_json::json!({"page_title": "D"}));
        let err = validate_link("D", &page, "D", &call).unwrap_err();
        assert_eq!(err.metadata["is_target_page"], serde_json::json!(true));
        assert_eq!(
            err.metadata["available_links_count"],
            serde_json::json!(1)
        );

        let err = validate_link("E", &page, "D", &call).unwrap_err();
        assert_eq!(err.metadata["is_target_page"], serde_json::json!(false));
    }

    #[test]
    fn legal_link_passes() {
        let page = page("A", &["B", "C"]);
        let call = call_with_args(serde_json::json!({"page_title": "B"}));
        assert!(validate_link("B", &page, "D", &call).is_ok());
    }
}
