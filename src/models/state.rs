//! Progression state: story-level state and per-player sessions.

use serde::{Deserialize, Serialize};

use super::Metadata;

/// Progression record of a story (current scene, flags, summary).
///
/// Shared by every player of the story unless the server runs with
/// player-scoped state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryState {
    pub scene_id: String,
    #[serde(default)]
    pub flags: Metadata,
    #[serde(default)]
    pub summary: String,
}

impl StoryState {
    /// Fresh state positioned at `entry_scene`.
    pub fn starting_at(entry_scene: impl Into<String>) -> Self {
        Self {
            scene_id: entry_scene.into(),
            flags: Metadata::new(),
            summary: String::new(),
        }
    }
}

/// A player's bound story and the scenes visited in the current playthrough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub current_story_id: Option<String>,
    pub path: Vec<String>,
}
