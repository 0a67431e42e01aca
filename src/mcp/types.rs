//! Request and response types of the MCP tools.
//!
//! Tool outputs must be JSON objects, so every list is wrapped in a response
//! struct.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Metadata, StoryState};

/// Request addressing a story.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryInput {
    /// Story directory name (e.g., "haunted_house")
    pub story_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryStateInput {
    pub story_id: String,
    /// Whose state to read when the server keeps per-player state
    #[serde(default)]
    pub player_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneInput {
    pub story_id: String,
    /// Scene id within the story (e.g., "intro")
    pub scene_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlayerInput {
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectStoryInput {
    pub player_id: String,
    pub story_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChooseInput {
    pub player_id: String,
    /// Scene the player is choosing in
    pub current_scene_id: String,
    /// Id of the picked choice
    pub choice_id: String,
    /// Optional free-form input from the player
    #[serde(default)]
    pub free_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadSceneImageInput {
    pub player_id: String,
    pub scene_id: String,
    /// Bounding box width in pixels (default 1024)
    #[serde(default)]
    pub max_width: Option<u32>,
    /// Bounding box height in pixels (default 1024)
    #[serde(default)]
    pub max_height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryListResponse {
    /// `{story_id, ...metadata}` per playable story, in catalog order
    pub stories: Vec<Value>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryMetaResponse {
    pub story_id: String,
    /// Empty when the story is unknown
    pub meta: Metadata,
}

/// Story progression as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoryStateView {
    pub scene_id: String,
    pub flags: Metadata,
    pub summary: String,
}

impl From<StoryState> for StoryStateView {
    fn from(state: StoryState) -> Self {
        Self {
            scene_id: state.scene_id,
            flags: state.flags,
            summary: state.summary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryStateResponse {
    pub story_id: String,
    /// Absent for unknown stories and stories without scenes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StoryStateView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryImagesResponse {
    pub story_id: String,
    /// Scene ids that have an image
    pub scene_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SceneResponse {
    pub story_id: String,
    pub scene_id: String,
    /// The scene document; absent when the scene does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlayerPathResponse {
    pub player_id: String,
    /// Scenes the player chose in, oldest first
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryLogResponse {
    pub story_id: String,
    /// `{ts, event, payload}` entries in append order
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectStoryResponse {
    pub story_id: String,
    pub scene_id: String,
    pub scene: Value,
}
