//! Scene image tool.

use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::Content;

use crate::error::NovelError;
use crate::mcp::{LoadSceneImageInput, NovelServer};
use crate::services::ProgressReporter;

impl NovelServer {
    /// Transcode the scene image and wrap it as base64 image content.
    pub async fn handle_load_scene_image(
        &self,
        Parameters(request): Parameters<LoadSceneImageInput>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Result<Content, NovelError> {
        let max_width = request.max_width.unwrap_or(self.default_max_width);
        let max_height = request.max_height.unwrap_or(self.default_max_height);

        let encoded = self
            .narrative
            .fetch_scene_image(
                &request.player_id,
                &request.scene_id,
                max_width,
                max_height,
                progress,
            )
            .await?;

        Ok(Content::image(
            general_purpose::STANDARD.encode(&encoded.bytes),
            encoded.mime_type(),
        ))
    }
}
