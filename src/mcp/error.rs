use rmcp::model::{Content, IntoContents};
use serde::Serialize;

use crate::error::NovelError;

/// Structured error response for MCP tool calls.
/// Provides error_code + suggestion so the narrator can recover.
#[derive(Debug, Serialize)]
pub struct ToolError {
    pub error_code: String,
    pub message: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ToolError {
    fn new(code: &str, message: String, suggestion: &str) -> Self {
        Self {
            error_code: code.to_string(),
            message,
            suggestion: suggestion.to_string(),
            field: None,
            details: None,
        }
    }

    fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoContents for ToolError {
    fn into_contents(self) -> Vec<Content> {
        let json = serde_json::to_string(&self).unwrap_or_else(|_| self.message.clone());
        vec![Content::text(json)]
    }
}

impl From<NovelError> for ToolError {
    fn from(err: NovelError) -> Self {
        let message = err.to_string();
        match err {
            NovelError::UnknownStory(story_id) => ToolError::new(
                "UNKNOWN_STORY",
                message,
                "Call list_stories and pick one of the returned story_id values.",
            )
            .field("story_id")
            .details(serde_json::json!({ "story_id": story_id })),
            NovelError::UnknownScene { story_id, scene_id } => ToolError::new(
                "UNKNOWN_SCENE",
                message,
                "Use the scene_id returned by select_story or get_story_state.",
            )
            .field("current_scene_id")
            .details(serde_json::json!({ "story_id": story_id, "scene_id": scene_id })),
            NovelError::NoStorySelected(player_id) => ToolError::new(
                "NO_STORY_SELECTED",
                message,
                "Call select_story for this player first.",
            )
            .field("player_id")
            .details(serde_json::json!({ "player_id": player_id })),
            NovelError::AssetNotFound {
                story_id, scene_id, ..
            } => ToolError::new(
                "ASSET_NOT_FOUND",
                message,
                "Call list_story_images to see which scenes have images; continue without one otherwise.",
            )
            .details(serde_json::json!({ "story_id": story_id, "scene_id": scene_id })),
            NovelError::SizeExceeded {
                final_width,
                final_height,
                final_bytes,
                limit,
                ..
            } => ToolError::new(
                "SIZE_EXCEEDED",
                message,
                "The image cannot be served under the size limit; continue without it.",
            )
            .details(serde_json::json!({
                "final_width": final_width,
                "final_height": final_height,
                "final_bytes": final_bytes,
                "limit": limit,
            })),
            NovelError::Config(_) | NovelError::Internal(_) => ToolError::new(
                "INTERNAL_ERROR",
                message,
                "Retry the operation.",
            ),
        }
    }
}
