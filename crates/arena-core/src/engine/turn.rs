//! The per-game state machine.
//!
//! One `TurnEngine` exclusively owns one `GameState` and is driven by one
//! logical task; callers serialize turns. Within a turn the agent call and
//! the page fetch are the only suspension points. Every failure is
//! terminal for the game: there is no in-engine retry, and `play_turn`
//! never returns an error. All failure is expressed through the state
//! and the returned game-over flag.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::events::{EventSink, GameEvent};
use crate::graph::PageSource;
use crate::models::{
    ErrorKind, GameConfig, GameError, GameResult, GameState, GameStatus, JsonMap, Move, Page,
    ToolCall, generate_game_id,
};
use crate::provider::LanguageModel;

use super::classifier::classify_agent_failure;
use super::tools::{ToolDescriptor, catalog};
use super::validator::{extract_target_title, validate_link, validate_structure};

/// Pure win/loss evaluation after a committed move. Title comparison is
/// exact: redirect resolution and case folding are the page source's
/// business, not this layer's.
pub fn evaluate_outcome(
    current_title: &str,
    target_title: &str,
    steps: u32,
    max_steps: u32,
) -> Option<GameStatus> {
    if current_title == target_title {
        Some(GameStatus::Won)
    } else if steps >= max_steps {
        Some(GameStatus::LostMaxSteps)
    } else {
        None
    }
}

pub struct TurnEngine {
    state: GameState,
    pages: Arc<dyn PageSource>,
    model: Arc<dyn LanguageModel>,
    tools: &'static [ToolDescriptor],
    events: EventSink,
}

impl TurnEngine {
    /// Builds the game and resolves the start page. A start page that
    /// cannot be resolved is fatal (status `Error`), not retried; no
    /// `game_ended` event fires because the game never reached
    /// `InProgress`.
    pub async fn initialize(
        config: GameConfig,
        pages: Arc<dyn PageSource>,
        model: Arc<dyn LanguageModel>,
        events: EventSink,
    ) -> Self {
        let game_id = generate_game_id(&config.model);
        let start_title = config.start_page_title.clone();
        let state = GameState::new(game_id, config);
        let mut engine = Self {
            state,
            pages,
            model,
            tools: catalog(),
            events,
        };

        match engine.pages.get_page(&start_title).await {
            Ok(page) => {
                engine.state.current_page = Some(page);
                engine.state.status = GameStatus::InProgress;
                info!(
                    game_id = %engine.state.game_id,
                    start = %start_title,
                    target = %engine.state.config.target_page_title,
                    "game started"
                );
            }
            Err(err) => {
                engine.state.status = GameStatus::Error;
                engine.state.error_message = Some(format!(
                    "failed to initialize start page '{start_title}': {err}"
                ));
                error!(game_id = %engine.state.game_id, %err, "start page could not be resolved");
            }
        }
        engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_result(self) -> GameResult {
        GameResult::from_state(&self.state)
    }

    /// Plays one turn; returns `true` when the game is over. Calling this
    /// on a terminal game is a no-op that returns `true`.
    pub async fn play_turn(&mut self) -> bool {
        if self.state.status != GameStatus::InProgress {
            debug!(
                game_id = %self.state.game_id,
                status = %self.state.status,
                "play_turn called on a finished game"
            );
            return true;
        }

        let step = self.state.steps + 1;
        let Some(current_page) = self.state.current_page.clone() else {
            // An in-progress game without a current page is a state bug,
            // not an agent fault.
            let mut metadata = JsonMap::new();
            metadata.insert("step".into(), step.into());
            let error = GameError::with_metadata(
                ErrorKind::AppUnknownError,
                "game is in progress without a current page",
                metadata,
            );
            let from_page = self.state.config.start_page_title.clone();
            self.finish_with_error(step, &from_page, None, error, GameStatus::Error);
            return true;
        };
        let from_page = current_page.title.clone();

        // 1. Request one action from the agent. A failure here is a
        // provider-layer problem and goes through the classifier.
        let call = match self.model.generate_response(self.tools, &self.state).await {
            Ok(call) => call,
            Err(err) => {
                let kind = classify_agent_failure(&err);
                let mut metadata = JsonMap::new();
                metadata.insert("step".into(), step.into());
                let error = GameError::with_metadata(
                    kind,
                    format!("language model call failed: {err:#}"),
                    metadata,
                );
                self.finish_with_error(step, &from_page, None, error, GameStatus::Error);
                return true;
            }
        };

        // 2-4. Structural validation, target extraction, link legality.
        // Any failure is the agent's loss.
        let validated = validate_structure(&call, self.tools)
            .and_then(|()| extract_target_title(&call))
            .and_then(|target| {
                validate_link(
                    &target,
                    &current_page,
                    &self.state.config.target_page_title,
                    &call,
                )
                .map(|()| target)
            });
        let target = match validated {
            Ok(target) => target,
            Err(error) => {
                self.finish_with_error(
                    step,
                    &from_page,
                    Some(&call),
                    error,
                    GameStatus::LostInvalidMove,
                );
                return true;
            }
        };

        // 5. Navigate. The target was validated against the link set, so
        // a failure here is the graph source's fault, not the agent's.
        let next_page = match self.pages.get_page(&target).await {
            Ok(page) => page,
            Err(err) => {
                let mut metadata = JsonMap::new();
                metadata.insert("target_page".into(), target.clone().into());
                metadata.insert("nav_error".into(), err.to_string().into());
                let error = GameError::with_metadata(
                    ErrorKind::AppNavigationError,
                    format!("navigation failed: {err}"),
                    metadata,
                );
                self.finish_with_error(step, &from_page, Some(&call), error, GameStatus::Error);
                return true;
            }
        };

        // 6. Commit and evaluate termination.
        self.commit_move(step, from_page, next_page, call)
    }

    fn commit_move(&mut self, step: u32, from_page: String, next_page: Page, call: ToolCall) -> bool {
        self.state.current_page = Some(next_page.clone());
        let mv = Move {
            step,
            from_page_title: from_page.clone(),
            to_page_title: Some(next_page.title.clone()),
            raw_text: call.raw_text.clone(),
            tool_call: call.attempt(),
            error: None,
            metrics: call.metrics,
        };
        self.state.move_history.push(mv.clone());
        self.state.steps += 1;
        info!(
            game_id = %self.state.game_id,
            step,
            from = %from_page,
            to = %next_page.title,
            "move committed"
        );

        let outcome = evaluate_outcome(
            &next_page.title,
            &self.state.config.target_page_title,
            self.state.steps,
            self.state.config.max_steps,
        );
        let game_over = if let Some(status) = outcome {
            self.state.status = status;
            if status == GameStatus::LostMaxSteps {
                self.state.error_message = Some("maximum steps reached".to_string());
            }
            info!(game_id = %self.state.game_id, status = %status, steps = self.state.steps, "game over");
            true
        } else {
            false
        };

        self.events.publish(GameEvent::MoveCompleted {
            game_id: self.state.game_id.clone(),
            last_move: mv,
            state: self.state.clone(),
        });
        if game_over {
            self.emit_game_ended();
        }
        game_over
    }

    /// Terminal failure path: appends exactly one error move (the failed
    /// attempt does not count as a completed step), then transitions and
    /// emits `game_ended` exactly once.
    fn finish_with_error(
        &mut self,
        step: u32,
        from_page: &str,
        call: Option<&ToolCall>,
        error: GameError,
        status: GameStatus,
    ) {
        warn!(
            game_id = %self.state.game_id,
            step,
            kind = ?error.kind,
            message = %error.message,
            "turn failed"
        );
        let mv = Move {
            step,
            from_page_title: from_page.to_string(),
            to_page_title: None,
            raw_text: call.and_then(|c| c.raw_text.clone()),
            tool_call: call.and_then(ToolCall::attempt),
            error: Some(error.clone()),
            metrics: call.and_then(|c| c.metrics.clone()),
        };
        self.state.move_history.push(mv);
        self.state.error_message = Some(error.message);
        self.state.status = status;
        self.emit_game_ended();
    }

    fn emit_game_ended(&self) {
        self.events.publish(GameEvent::GameEnded {
            game_id: self.state.game_id.clone(),
            state: self.state.clone(),
        });
    }
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("game_id", &self.state.game_id)
            .field("status", &self.state.status)
            .field("steps", &self.state.steps)
            .finish()
    }
}
