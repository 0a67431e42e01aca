use rmcp::ErrorData as McpError;
use serde::Serialize;
use serde_json::json;

use super::NovelResource;
use crate::services::NarrativeService;

fn to_json(value: &impl Serialize) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize resource: {}", e), None))
}

/// Render a resource as pretty JSON.
///
/// Lookups never fail: unknown stories and scenes render as `{}` and
/// list-valued resources of unknown keys as `[]`.
pub async fn render_resource(
    service: &NarrativeService,
    resource: &NovelResource,
) -> Result<String, McpError> {
    match resource {
        NovelResource::Stories => to_json(&service.list_stories()),
        NovelResource::StoryMeta(story_id) => match service.get_story_meta(story_id) {
            Some(meta) => to_json(&meta),
            None => to_json(&json!({})),
        },
        NovelResource::StoryImages(story_id) => to_json(&service.list_story_images(story_id)),
        NovelResource::StoryState(story_id) => match service.get_story_state(story_id, None).await {
            Some(state) => to_json(&state),
            None => to_json(&json!({})),
        },
        NovelResource::Scene { story_id, scene_id } => {
            let document = service
                .get_scene(story_id, scene_id)
                .map(|scene| scene.to_document())
                .unwrap_or_else(|| json!({}));
            to_json(&document)
        }
        NovelResource::PlayerPath(player_id) => to_json(&service.get_player_path(player_id).await),
        NovelResource::StoryLog(story_id) => to_json(&service.get_story_log(story_id).await),
    }
}
