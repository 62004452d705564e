//! Plays one link-navigation game end to end: loads a TOML config and a
//! JSON link-graph fixture, builds the configured provider, drives the
//! turn engine until the game is over, and prints the `GameResult` as
//! JSON on stdout. Lifecycle events are logged from a subscriber task,
//! the same way an external fan-out hub would consume them.

mod config;
mod graph;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use arena_core::engine::TurnEngine;
use arena_core::events::{EventSink, GameEvent};
use arena_core::provider::{LanguageModel, ProviderRegistry};

use crate::config::RunnerConfig;
use crate::graph::StaticGraphSource;

#[derive(Debug, Parser)]
#[command(
    name = "arena-runner",
    about = "Play one link-navigation game and print the result as JSON."
)]
struct Cli {
    /// TOML config, searched in ARENA_CONFIG_DIR, CWD, then <repo>/config/.
    #[arg(long, default_value = "arena.toml")]
    config: String,

    /// Override the graph fixture path from the config.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Override the start page title.
    #[arg(long)]
    start: Option<String>,

    /// Override the target page title.
    #[arg(long)]
    target: Option<String>,

    /// Override the maximum step count.
    #[arg(long)]
    max_steps: Option<u32>,

    /// Override the provider id (e.g. "random", "ollama").
    #[arg(long)]
    provider: Option<String>,

    /// Override the model name.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut cfg = RunnerConfig::load(&cli.config)?;
    if let Some(graph) = cli.graph {
        cfg.graph = graph;
    }
    if let Some(start) = cli.start {
        cfg.game.start_page_title = start;
    }
    if let Some(target) = cli.target {
        cfg.game.target_page_title = target;
    }
    if let Some(max_steps) = cli.max_steps {
        cfg.game.max_steps = max_steps;
    }
    if let Some(provider) = cli.provider {
        cfg.game.model.provider = provider;
    }
    if let Some(model) = cli.model {
        cfg.game.model.model_name = model;
    }

    let graph_path = config::resolve_path(&cfg.graph.to_string_lossy())?;
    let pages = Arc::new(StaticGraphSource::load(&graph_path)?);
    info!(
        pages = pages.page_count(),
        graph = %graph_path.display(),
        "graph loaded"
    );

    let registry = ProviderRegistry::builtin();
    let model: Arc<dyn LanguageModel> = Arc::from(registry.create(&cfg.game.model)?);

    let events = EventSink::default();
    let mut rx = events.subscribe();
    let observer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(GameEvent::MoveCompleted {
                    game_id, last_move, ..
                }) => {
                    info!(
                        %game_id,
                        step = last_move.step,
                        from = %last_move.from_page_title,
                        to = last_move.to_page_title.as_deref().unwrap_or("-"),
                        "move_completed"
                    );
                }
                Ok(GameEvent::GameEnded { game_id, state }) => {
                    info!(%game_id, status = %state.status, steps = state.steps, "game_ended");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event observer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut engine = TurnEngine::initialize(cfg.game, pages, model, events.clone()).await;
    while !engine.play_turn().await {}

    let result = engine.into_result();
    drop(events);
    let _ = observer.await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
