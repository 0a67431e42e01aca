//! Read-only catalog tools: story listing, metadata, scenes and images.

use rmcp::handler::server::wrapper::Parameters;

use crate::error::NovelError;
use crate::mcp::{
    NovelServer, SceneInput, SceneResponse, StoryImagesResponse, StoryInput, StoryListResponse,
    StoryMetaResponse,
};

impl NovelServer {
    pub async fn handle_list_stories(&self) -> Result<StoryListResponse, NovelError> {
        let stories = self
            .narrative
            .list_stories()
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NovelError::Internal(format!("Failed to serialize stories: {}", e)))?;
        Ok(StoryListResponse {
            total: stories.len(),
            stories,
        })
    }

    pub async fn handle_get_story_meta(
        &self,
        Parameters(request): Parameters<StoryInput>,
    ) -> Result<StoryMetaResponse, NovelError> {
        let meta = self
            .narrative
            .get_story_meta(&request.story_id)
            .unwrap_or_default();
        Ok(StoryMetaResponse {
            story_id: request.story_id,
            meta,
        })
    }

    pub async fn handle_list_story_images(
        &self,
        Parameters(request): Parameters<StoryInput>,
    ) -> Result<StoryImagesResponse, NovelError> {
        Ok(StoryImagesResponse {
            scene_ids: self.narrative.list_story_images(&request.story_id),
            story_id: request.story_id,
        })
    }

    pub async fn handle_get_scene(
        &self,
        Parameters(request): Parameters<SceneInput>,
    ) -> Result<SceneResponse, NovelError> {
        let scene = self
            .narrative
            .get_scene(&request.story_id, &request.scene_id)
            .map(|scene| scene.to_document());
        Ok(SceneResponse {
            story_id: request.story_id,
            scene_id: request.scene_id,
            scene,
        })
    }
}
