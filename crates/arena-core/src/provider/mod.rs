//! The agent-interface seam: a capability trait for "given game state and
//! a tool catalog, propose one action", typed provider failures for the
//! classifier, and an explicit registry mapping provider ids to
//! constructors so new adapters never touch the engine.

pub mod ollama;
pub mod prompt;
pub mod random;
pub mod wire;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::engine::tools::ToolDescriptor;
use crate::models::{GameState, ModelConfig, ToolCall};

/// Structured failure an adapter can attach to its error chain so the
/// classifier does not have to guess from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
    RateLimited,
    Timeout,
    Api { status: u16 },
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::RateLimited => write!(f, "provider rate limited the request"),
            ProviderError::Timeout => write!(f, "provider request timed out"),
            ProviderError::Api { status } => write!(f, "provider api error (status {status})"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One proposed action per call. Implementations should return a
/// [`ToolCall`] with unset fields rather than an `Err` when the model
/// answered but produced nothing usable; `Err` is for the call itself
/// failing.
pub trait LanguageModel: std::fmt::Debug + Send + Sync {
    fn generate_response<'a>(
        &'a self,
        tools: &'a [ToolDescriptor],
        state: &'a GameState,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ToolCall>> + Send + 'a>>;
}

type Constructor = fn(&ModelConfig) -> anyhow::Result<Box<dyn LanguageModel>>;

/// Explicitly constructed provider table; callers build one and pass it
/// where needed instead of consulting process-global state.
#[derive(Default)]
pub struct ProviderRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the in-tree adapters registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("random", |_config| {
            Ok(Box::new(random::RandomModel::default()))
        });
        registry.register("ollama", |config| {
            Ok(Box::new(ollama::OllamaModel::new(config)?))
        });
        registry
    }

    pub fn register(&mut self, provider: impl Into<String>, constructor: Constructor) {
        self.constructors.insert(provider.into(), constructor);
    }

    pub fn providers(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn create(&self, config: &ModelConfig) -> anyhow::Result<Box<dyn LanguageModel>> {
        match self.constructors.get(&config.provider) {
            Some(constructor) => constructor(config),
            None => anyhow::bail!(
                "unknown provider '{}' (available: {})",
                config.provider,
                self.providers().join(", ")
            ),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}
