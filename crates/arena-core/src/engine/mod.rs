//! The per-game turn engine and its supporting pieces: the static tool
//! catalog, the synchronous move validator, and the agent-failure
//! classifier. `TurnEngine` is the only writer of a game's state.

pub mod classifier;
pub mod tools;
pub mod turn;
pub mod validator;

pub use classifier::classify_agent_failure;
pub use tools::{NAVIGATE_TOOL, ToolDescriptor, catalog, tool_by_name};
pub use turn::{TurnEngine, evaluate_outcome};
