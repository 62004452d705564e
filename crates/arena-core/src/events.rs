//! Lifecycle events and their fan-out handle.
//!
//! The sink is an explicitly constructed dependency passed to each engine;
//! there is no process-global hub. Publishing goes through a broadcast
//! channel: it never blocks a turn, and a slow or disconnected subscriber
//! lags on its own receiver instead of stalling game progress.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{GameState, Move};

/// Notification emitted by a turn engine. Payloads are full snapshots so
/// subscribers can serialize them without reaching back into the game.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    MoveCompleted {
        game_id: String,
        #[serde(rename = "move")]
        last_move: Move,
        state: GameState,
    },
    GameEnded {
        game_id: String,
        state: GameState,
    },
}

impl GameEvent {
    pub fn game_id(&self) -> &str {
        match self {
            GameEvent::MoveCompleted { game_id, .. } | GameEvent::GameEnded { game_id, .. } => {
                game_id
            }
        }
    }
}

/// Cheaply cloneable publish handle, safe for concurrent delivery from
/// many unrelated games.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<GameEvent>,
}

impl EventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Fire-and-forget delivery. A send error only means nobody is
    /// listening right now; game progress must not depend on observers.
    pub fn publish(&self, event: GameEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("event dropped: no live subscribers");
        }
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameConfig, GameState, JsonMap, ModelConfig};

    fn state() -> GameState {
        GameState::new(
            "g1",
            GameConfig {
                start_page_title: "A".to_string(),
                target_page_title: "B".to_string(),
                max_steps: 5,
                model: ModelConfig {
                    provider: "random".to_string(),
                    model_name: "random".to_string(),
                    settings: JsonMap::new(),
                    input_cost_per_1m_tokens: None,
                    output_cost_per_1m_tokens: None,
                },
                system_prompt_template: String::new(),
            },
        )
    }

    #[test]
    fn publish_without_subscribers_does_not_fail() {
        let sink = EventSink::default();
        sink.publish(GameEvent::GameEnded {
            game_id: "g1".to_string(),
            state: state(),
        });
    }

    #[tokio::test]
    async fn all_subscribers_receive_each_event() {
        let sink = EventSink::default();
        let mut rx1 = sink.subscribe();
        let mut rx2 = sink.subscribe();

        sink.publish(GameEvent::GameEnded {
            game_id: "g1".to_string(),
            state: state(),
        });

        let e1 = rx1.recv().await.expect("rx1");
        let e2 = rx2.recv().await.expect("rx2");
        assert_eq!(e1.game_id(), "g1");
        assert_eq!(e2.game_id(), "g1");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = GameEvent::GameEnded {
            game_id: "g1".to_string(),
            state: state(),
        };
        let v = serde_json::to_value(&event).expect("json");
        assert_eq!(v["type"], serde_json::json!("game_ended"));
        assert_eq!(v["game_id"], serde_json::json!("g1"));
    }
}
