//! Runner configuration: a TOML file holding the game settings and the
//! path to the link-graph fixture.
//!
//! Search order for relative paths:
//! 1) `ARENA_CONFIG_DIR/<relative_path>`
//! 2) `./<relative_path>`
//! 3) `<repo_root>/config/<relative_path>` (repo-local convenience)

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use arena_core::models::GameConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Path to the JSON adjacency file, resolved with the same search
    /// order as the config file itself when relative.
    pub graph: PathBuf,
    pub game: GameConfig,
}

impl RunnerConfig {
    pub fn load(relative_path: &str) -> anyhow::Result<Self> {
        let path = resolve_path(relative_path)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("failed to parse TOML config")
    }
}

pub fn resolve_path(relative_path: &str) -> anyhow::Result<PathBuf> {
    let rel = Path::new(relative_path);
    if rel.is_absolute() {
        return Ok(rel.to_path_buf());
    }

    if let Some(root) = env::var_os("ARENA_CONFIG_DIR") {
        let candidate = PathBuf::from(root).join(rel);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        let candidate = cwd.join(rel);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    // Repo convenience: <repo_root>/config/<relative_path>.
    // This crate typically lives at <repo_root>/crates/runner.
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .ok_or_else(|| anyhow::anyhow!("CARGO_MANIFEST_DIR has insufficient ancestors"))?
        .join("config")
        .join(rel);
    if candidate.is_file() {
        return Ok(candidate);
    }

    anyhow::bail!("config file not found for {rel:?}")
}
