//! Player-facing tools: selection, choices, state, paths and logs.

use rmcp::handler::server::wrapper::Parameters;

use crate::error::NovelError;
use crate::mcp::{
    ChooseInput, NovelServer, PlayerInput, PlayerPathResponse, SelectStoryInput,
    SelectStoryResponse, StoryInput, StoryLogResponse, StoryStateInput, StoryStateResponse,
};

impl NovelServer {
    pub async fn handle_get_story_state(
        &self,
        Parameters(request): Parameters<StoryStateInput>,
    ) -> Result<StoryStateResponse, NovelError> {
        let state = self
            .narrative
            .get_story_state(&request.story_id, request.player_id.as_deref())
            .await
            .map(Into::into);
        Ok(StoryStateResponse {
            story_id: request.story_id,
            state,
        })
    }

    pub async fn handle_get_player_path(
        &self,
        Parameters(request): Parameters<PlayerInput>,
    ) -> Result<PlayerPathResponse, NovelError> {
        Ok(PlayerPathResponse {
            path: self.narrative.get_player_path(&request.player_id).await,
            player_id: request.player_id,
        })
    }

    pub async fn handle_get_story_log(
        &self,
        Parameters(request): Parameters<StoryInput>,
    ) -> Result<StoryLogResponse, NovelError> {
        let events = self
            .narrative
            .get_story_log(&request.story_id)
            .await
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NovelError::Internal(format!("Failed to serialize events: {}", e)))?;
        Ok(StoryLogResponse {
            story_id: request.story_id,
            events,
        })
    }

    pub async fn handle_select_story(
        &self,
        Parameters(request): Parameters<SelectStoryInput>,
    ) -> Result<SelectStoryResponse, NovelError> {
        let selected = self
            .narrative
            .select_story(&request.player_id, &request.story_id)
            .await?;
        Ok(SelectStoryResponse {
            story_id: selected.story_id,
            scene_id: selected.scene_id,
            scene: selected.scene.to_document(),
        })
    }

    pub async fn handle_choose(
        &self,
        Parameters(request): Parameters<ChooseInput>,
    ) -> Result<String, NovelError> {
        let ack = self
            .narrative
            .record_choice(
                &request.player_id,
                &request.current_scene_id,
                &request.choice_id,
                request.free_text.as_deref(),
            )
            .await?;
        Ok(ack.to_string())
    }
}
