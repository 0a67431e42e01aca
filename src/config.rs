//! Runtime configuration: content root resolution and `novelgame.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::image::DEFAULT_MAX_DIMENSION;
use crate::session::StateScope;

pub const CONFIG_FILE: &str = "novelgame.toml";
pub const CONTENT_ROOT_ENV: &str = "NOVELGAME_CONTENT_ROOT";
pub const STATE_SCOPE_ENV: &str = "NOVELGAME_STATE_SCOPE";

fn default_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

/// Server settings read from `{content_root}/novelgame.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NovelConfig {
    /// Whether story state is shared by all players or kept per player.
    #[serde(default)]
    pub state_scope: StateScope,
    /// Default bounding box for `load_scene_image`.
    #[serde(default = "default_dimension")]
    pub max_width: u32,
    #[serde(default = "default_dimension")]
    pub max_height: u32,
}

impl Default for NovelConfig {
    fn default() -> Self {
        Self {
            state_scope: StateScope::default(),
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Content root priority: explicit path > `NOVELGAME_CONTENT_ROOT` env >
/// current directory (if it has `stories/`) > `~/.novelgame`.
pub fn resolve_content_root(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var(CONTENT_ROOT_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let local = Path::new("stories");
            if local.is_dir() {
                Some(PathBuf::from("."))
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".novelgame"))
                .unwrap_or_else(|| PathBuf::from(".novelgame"))
        })
}

/// Load config with priority:
/// 1. `{content_root}/novelgame.toml`, falling back to defaults on any error
/// 2. `NOVELGAME_STATE_SCOPE` env var overrides `state_scope`
pub fn load_config(content_root: &Path) -> NovelConfig {
    load_config_with_env(content_root, std::env::var(STATE_SCOPE_ENV).ok())
}

fn load_config_with_env(content_root: &Path, scope_override: Option<String>) -> NovelConfig {
    let mut config = read_config_file(&content_root.join(CONFIG_FILE));

    if let Some(raw) = scope_override {
        match raw.parse::<StateScope>() {
            Ok(scope) => {
                tracing::info!(?scope, "State scope set from {}", STATE_SCOPE_ENV);
                config.state_scope = scope;
            }
            Err(e) => tracing::warn!("Ignoring {}: {}", STATE_SCOPE_ENV, e),
        }
    }

    config
}

fn read_config_file(config_path: &Path) -> NovelConfig {
    if !config_path.exists() {
        return NovelConfig::default();
    }
    match std::fs::read_to_string(config_path) {
        Ok(contents) => match toml::from_str::<NovelConfig>(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                NovelConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            NovelConfig::default()
        }
    }
}
