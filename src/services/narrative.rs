//! Narrative operations exposed to the MCP server and the CLI.

use std::sync::Arc;

use crate::catalog::ContentCatalog;
use crate::error::NovelError;
use crate::image::{EncodedImage, ImageTranscoder};
use crate::models::{Event, Metadata, Scene, StoryState, StorySummary};
use crate::services::progress::ProgressReporter;
use crate::session::{EventLog, SelectedStory, SessionStore};

/// Façade over catalog, sessions, event log and transcoder.
///
/// Catalog lookups never fail: unknown keys give `None` or an empty list.
/// Only selection, choices and image fetches return errors.
pub struct NarrativeService {
    catalog: Arc<ContentCatalog>,
    sessions: Arc<SessionStore>,
    events: Arc<EventLog>,
    transcoder: Arc<ImageTranscoder>,
}

impl NarrativeService {
    pub fn new(
        catalog: Arc<ContentCatalog>,
        sessions: Arc<SessionStore>,
        events: Arc<EventLog>,
        transcoder: Arc<ImageTranscoder>,
    ) -> Self {
        Self {
            catalog,
            sessions,
            events,
            transcoder,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Playable stories in catalog order.
    pub fn list_stories(&self) -> Vec<StorySummary> {
        self.catalog.list_stories()
    }

    pub fn get_story_meta(&self, story_id: &str) -> Option<Metadata> {
        self.catalog.get_meta(story_id).cloned()
    }

    pub async fn get_story_state(
        &self,
        story_id: &str,
        player_id: Option<&str>,
    ) -> Option<StoryState> {
        self.sessions.story_state(story_id, player_id).await
    }

    pub fn list_story_images(&self, story_id: &str) -> Vec<String> {
        self.catalog.list_image_scene_ids(story_id)
    }

    pub fn get_scene(&self, story_id: &str, scene_id: &str) -> Option<Scene> {
        self.catalog.get_scene(story_id, scene_id).cloned()
    }

    pub async fn get_player_path(&self, player_id: &str) -> Vec<String> {
        self.sessions.player_path(player_id).await
    }

    pub async fn get_story_log(&self, story_id: &str) -> Vec<Event> {
        self.events.read(story_id).await
    }

    pub async fn select_story(
        &self,
        player_id: &str,
        story_id: &str,
    ) -> Result<SelectedStory, NovelError> {
        self.sessions.select_story(player_id, story_id).await
    }

    pub async fn record_choice(
        &self,
        player_id: &str,
        current_scene_id: &str,
        choice_id: &str,
        free_text: Option<&str>,
    ) -> Result<&'static str, NovelError> {
        self.sessions
            .record_choice(player_id, current_scene_id, choice_id, free_text)
            .await
    }

    /// Image of `scene_id` in the player's bound story, sized to fit.
    pub async fn fetch_scene_image(
        &self,
        player_id: &str,
        scene_id: &str,
        max_width: u32,
        max_height: u32,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<EncodedImage, NovelError> {
        let story_id = self
            .sessions
            .current_story(player_id)
            .await
            .ok_or_else(|| NovelError::NoStorySelected(player_id.to_string()))?;

        self.scene_image(&story_id, scene_id, max_width, max_height, progress)
            .await
    }

    /// Image of a scene addressed directly by story, without a player.
    pub async fn scene_image(
        &self,
        story_id: &str,
        scene_id: &str,
        max_width: u32,
        max_height: u32,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<EncodedImage, NovelError> {
        progress.step(0, 2, "Resolving scene image").await;
        let path = self
            .catalog
            .resolve_image_path(story_id, scene_id)
            .ok_or_else(|| NovelError::missing_image(story_id, scene_id))?
            .to_path_buf();

        progress.step(1, 2, "Transcoding").await;
        let transcoder = self.transcoder.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            transcoder.transcode(&path, max_width, max_height)
        })
        .await
        .map_err(|e| NovelError::Internal(format!("image worker failed: {}", e)))??;

        progress.step(2, 2, "Image ready").await;
        tracing::info!(
            story_id,
            scene_id,
            width = encoded.width,
            height = encoded.height,
            size = encoded.bytes.len(),
            "Scene image served"
        );
        Ok(encoded)
    }
}
