//! Game data model: everything here is plain data so the broadcast and REST
//! layers can serialize any of it without special cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON object used for free-form metadata and tool arguments.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Won,
    LostMaxSteps,
    LostInvalidMove,
    Error,
}

impl GameStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::NotStarted | GameStatus::InProgress)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameStatus::NotStarted => "not_started",
            GameStatus::InProgress => "in_progress",
            GameStatus::Won => "won",
            GameStatus::LostMaxSteps => "lost_max_steps",
            GameStatus::LostInvalidMove => "lost_invalid_move",
            GameStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Closed error taxonomy. `Model*` kinds are the agent's fault, `Provider*`
/// kinds are infrastructure, `App*` kinds are ours.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ModelNoToolCall,
    ModelInvalidTool,
    ModelInvalidLink,
    ModelGenerationError,
    ProviderApiError,
    ProviderTimeout,
    ProviderRateLimit,
    AppNavigationError,
    AppUnknownError,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub metadata: JsonMap,
}

impl GameError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata: JsonMap::new(),
        }
    }

    pub fn with_metadata(kind: ErrorKind, message: impl Into<String>, metadata: JsonMap) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata,
        }
    }
}

/// Metrics for a single language model API call.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CallMetrics {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default)]
    pub estimated_cost_usd: f64,
    #[serde(default)]
    pub response_time_ms: f64,
    pub request_timestamp: DateTime<Utc>,
}

impl CallMetrics {
    /// Metrics for an adapter that only observes latency (no token counts).
    pub fn from_latency(response_time_ms: f64) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            estimated_cost_usd: 0.0,
            response_time_ms,
            request_timestamp: Utc::now(),
        }
    }
}

/// A page of the hyperlink graph. Immutable once returned by a
/// [`crate::graph::PageSource`]; link membership checks are exact and
/// case-sensitive.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Page {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelConfig {
    /// Provider id as registered in the provider registry, e.g. "random".
    pub provider: String,
    pub model_name: String,
    #[serde(default)]
    pub settings: JsonMap,
    #[serde(default)]
    pub input_cost_per_1m_tokens: Option<f64>,
    #[serde(default)]
    pub output_cost_per_1m_tokens: Option<f64>,
}

pub const DEFAULT_SYSTEM_PROMPT_TEMPLATE: &str = "You are in a link-navigation arena. Your goal is to navigate from the starting page to the target page using ONLY the links on the current page.\n\
Start Page: '{start_page_title}'\n\
Target Page: '{target_page_title}'\n\n\
Navigate one step closer to the target page by passing a page title from the current page to the tools provided for you.\n";

fn default_max_steps() -> u32 {
    30
}

fn default_system_prompt_template() -> String {
    DEFAULT_SYSTEM_PROMPT_TEMPLATE.to_string()
}

/// Immutable per-game settings, fixed at creation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GameConfig {
    pub start_page_title: String,
    pub target_page_title: String,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    pub model: ModelConfig,
    #[serde(default = "default_system_prompt_template")]
    pub system_prompt_template: String,
}

/// The agent's proposed action. Every field is optional: a model can fail
/// to produce any usable call, and the engine still needs to record what
/// it got back.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ToolCall {
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<JsonMap>,
    #[serde(default)]
    pub metrics: Option<CallMetrics>,
}

impl ToolCall {
    /// The name+arguments pair recorded on a [`Move`], or `None` when the
    /// model produced neither.
    pub fn attempt(&self) -> Option<ToolCallAttempt> {
        if self.name.is_none() && self.arguments.is_none() {
            return None;
        }
        Some(ToolCallAttempt {
            name: self.name.clone(),
            arguments: self.arguments.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolCallAttempt {
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<JsonMap>,
}

/// One turn attempt, successful or not. Append-only: never mutated after
/// being pushed onto the history.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Move {
    /// 1-based step number this attempt was made at.
    pub step: u32,
    pub from_page_title: String,
    /// `None` when the turn failed before a page was reached.
    #[serde(default)]
    pub to_page_title: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub tool_call: Option<ToolCallAttempt>,
    #[serde(default)]
    pub error: Option<GameError>,
    #[serde(default)]
    pub metrics: Option<CallMetrics>,
}

/// The single mutable aggregate for one game. Owned exclusively by its
/// [`crate::engine::TurnEngine`]; nothing else writes to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameState {
    pub game_id: String,
    pub config: GameConfig,
    pub status: GameStatus,
    #[serde(default)]
    pub current_page: Option<Page>,
    #[serde(default)]
    pub move_history: Vec<Move>,
    #[serde(default)]
    pub steps: u32,
    pub start_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl GameState {
    pub fn new(game_id: impl Into<String>, config: GameConfig) -> Self {
        Self {
            game_id: game_id.into(),
            config,
            status: GameStatus::NotStarted,
            current_page: None,
            move_history: Vec::new(),
            steps: 0,
            start_timestamp: Utc::now(),
            error_message: None,
        }
    }
}

/// Descriptive game id: model name, wall-clock, short random suffix.
pub fn generate_game_id(model: &ModelConfig) -> String {
    let date = Utc::now().format("%Y%m%d_%H%M%S");
    let suffix: u16 = rand::random();
    format!("{}_{date}_{suffix:04x}", model.model_name)
}

/// Summary of a finished game for storage and post-hoc analysis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameResult {
    pub game_id: String,
    pub config: GameConfig,
    pub status: GameStatus,
    pub steps: u32,
    /// Page title sequence actually walked, starting page included.
    pub path_taken: Vec<String>,
    pub moves: Vec<Move>,
    pub start_timestamp: DateTime<Utc>,
    pub end_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub total_input_tokens: u32,
    pub total_output_tokens: u32,
    pub total_tokens: u32,
    pub total_estimated_cost_usd: f64,
    pub total_api_time_ms: f64,
    pub average_response_time_ms: f64,
    pub api_call_count: u32,
    pub metadata: JsonMap,
}

impl GameResult {
    pub fn from_state(state: &GameState) -> Self {
        let mut path_taken = Vec::new();
        if let Some(first) = state.move_history.first() {
            path_taken.push(first.from_page_title.clone());
        } else {
            path_taken.push(state.config.start_page_title.clone());
        }
        for mv in &state.move_history {
            if let Some(to) = &mv.to_page_title {
                path_taken.push(to.clone());
            }
        }

        let mut total_input_tokens = 0u32;
        let mut total_output_tokens = 0u32;
        let mut total_tokens = 0u32;
        let mut total_estimated_cost_usd = 0.0f64;
        let mut total_api_time_ms = 0.0f64;
        let mut api_call_count = 0u32;
        for mv in &state.move_history {
            if let Some(metrics) = &mv.metrics {
                total_input_tokens += metrics.input_tokens;
                total_output_tokens += metrics.output_tokens;
                total_tokens += metrics.total_tokens;
                total_estimated_cost_usd += metrics.estimated_cost_usd;
                total_api_time_ms += metrics.response_time_ms;
                api_call_count += 1;
            }
        }
        let average_response_time_ms = if api_call_count > 0 {
            total_api_time_ms / f64::from(api_call_count)
        } else {
            0.0
        };

        let error_kinds: Vec<serde_json::Value> = state
            .move_history
            .iter()
            .filter_map(|mv| mv.error.as_ref())
            .filter_map(|err| serde_json::to_value(err.kind).ok())
            .collect();
        let successful_moves = state
            .move_history
            .iter()
            .filter(|mv| mv.to_page_title.is_some())
            .count();
        let failed_moves = state
            .move_history
            .iter()
            .filter(|mv| mv.error.is_some())
            .count();

        let mut metadata = JsonMap::new();
        metadata.insert(
            "model_name".into(),
            state.config.model.model_name.clone().into(),
        );
        metadata.insert(
            "model_provider".into(),
            state.config.model.provider.clone().into(),
        );
        metadata.insert(
            "links_on_final_page".into(),
            state
                .current_page
                .as_ref()
                .map(|p| p.links.len())
                .unwrap_or(0)
                .into(),
        );
        metadata.insert("error_kinds".into(), error_kinds.into());
        metadata.insert("successful_moves".into(), successful_moves.into());
        metadata.insert("failed_moves".into(), failed_moves.into());
        metadata.insert(
            "target_reached".into(),
            (state.status == GameStatus::Won).into(),
        );
        metadata.insert(
            "start_page".into(),
            state.config.start_page_title.clone().into(),
        );
        metadata.insert(
            "target_page".into(),
            state.config.target_page_title.clone().into(),
        );

        Self {
            game_id: state.game_id.clone(),
            config: state.config.clone(),
            status: state.status,
            steps: state.steps,
            path_taken,
            moves: state.move_history.clone(),
            start_timestamp: state.start_timestamp,
            end_timestamp: Utc::now(),
            error_message: state.error_message.clone(),
            total_input_tokens,
            total_output_tokens,
            total_tokens,
            total_estimated_cost_usd,
            total_api_time_ms,
            average_response_time_ms,
            api_call_count,
            metadata,
        }
    }
}
