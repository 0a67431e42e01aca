//! Test harness: an isolated content root per test.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use novelgame::catalog::{CollectingLoadSink, ContentCatalog, LoadIssue};
use novelgame::config::NovelConfig;
use novelgame::init::AppContext;
use novelgame::mcp::NovelServer;
use novelgame::services::NarrativeService;
use novelgame::session::StateScope;

use super::builders::StoryBuilder;

/// Owns a temporary content root; removed when dropped.
pub struct TestHarness {
    pub temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp content root"),
        }
    }

    /// Harness with the two-story library most tests play through:
    /// `haunted_house` (intro → hall/cellar, with images) and `lost_letter`.
    pub fn with_library() -> Self {
        let harness = Self::new();
        harness
            .story("haunted_house")
            .titled("The Haunted House")
            .scene_with_choices("intro", &["enter", "leave"])
            .scene_with_choices("hall", &["upstairs", "cellar"])
            .scene("cellar", "body: It is dark.\n")
            .png_image("intro", 320, 200)
            .jpeg_image("hall", 640, 480);
        harness
            .story("lost_letter")
            .titled("The Lost Letter")
            .scene_with_choices("a_morning", &["read", "burn"])
            .scene_with_choices("b_evening", &["sleep"]);
        harness
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn story(&self, story_id: &str) -> StoryBuilder {
        StoryBuilder::new(self.root(), story_id)
    }

    /// Build the catalog directly and return it with its load issues.
    pub fn catalog(&self) -> (ContentCatalog, Vec<LoadIssue>) {
        let sink = CollectingLoadSink::new();
        let catalog = ContentCatalog::load(self.root(), &sink);
        (catalog, sink.issues())
    }

    pub async fn context(&self) -> AppContext {
        self.context_with(NovelConfig::default()).await
    }

    pub async fn context_with(&self, config: NovelConfig) -> AppContext {
        AppContext::with_sink(self.root().to_path_buf(), config, &CollectingLoadSink::new())
            .await
            .expect("Failed to build app context")
    }

    pub async fn narrative(&self) -> Arc<NarrativeService> {
        self.context().await.narrative
    }

    pub async fn player_scoped_narrative(&self) -> Arc<NarrativeService> {
        let config = NovelConfig {
            state_scope: StateScope::Player,
            ..NovelConfig::default()
        };
        self.context_with(config).await.narrative
    }

    pub async fn server(&self) -> NovelServer {
        NovelServer::from_context(&self.context().await)
    }
}
