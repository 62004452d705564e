//! Core engine for a link-navigation arena: a language model starts on one
//! page of a hyperlink graph and must reach a target page by choosing one
//! outgoing link per turn.
//!
//! This crate owns the per-game state machine (`engine::TurnEngine`), its
//! error taxonomy, the move validator, and the lifecycle event types. Page
//! lookup (`graph::PageSource`) and the model itself
//! (`provider::LanguageModel`) are trait seams so binaries and tests can
//! supply their own implementations.

pub mod engine;
pub mod events;
pub mod graph;
pub mod models;
pub mod provider;
