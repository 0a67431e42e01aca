//! Shared initialization logic for MCP and CLI modes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{CollectingLoadSink, ContentCatalog, LoadSink, TracingLoadSink};
use crate::config::{load_config, resolve_content_root, NovelConfig};
use crate::image::ImageTranscoder;
use crate::services::NarrativeService;
use crate::session::{EventLog, SessionStore};

/// Application context holding the loaded catalog and the narrative service.
///
/// Shared between MCP server and CLI commands.
pub struct AppContext {
    pub content_root: PathBuf,
    pub config: NovelConfig,
    pub catalog: Arc<ContentCatalog>,
    pub narrative: Arc<NarrativeService>,
}

impl AppContext {
    /// Resolve the content root, read config and build the catalog.
    ///
    /// Content root priority: explicit path > NOVELGAME_CONTENT_ROOT env >
    /// ./stories (if exists) > ~/.novelgame
    pub async fn new(explicit_path: Option<PathBuf>) -> Result<Self> {
        let content_root = resolve_content_root(explicit_path);
        tracing::info!("Using content root: {}", content_root.display());

        let config = load_config(&content_root);
        Self::with_sink(content_root, config, &TracingLoadSink).await
    }

    /// Build the context from an already resolved root and config, reporting
    /// catalog issues to `sink`.
    pub async fn with_sink(
        content_root: PathBuf,
        config: NovelConfig,
        sink: &dyn LoadSink,
    ) -> Result<Self> {
        let loader_root = content_root.clone();
        let (catalog, issues) = tokio::task::spawn_blocking(move || {
            let collected = CollectingLoadSink::new();
            let catalog = ContentCatalog::load(&loader_root, &collected);
            (catalog, collected.issues())
        })
        .await?;
        for issue in issues {
            sink.record(issue);
        }
        let catalog = Arc::new(catalog);
        tracing::info!(
            stories = catalog.playable_count(),
            scenes = catalog.scene_count(),
            "Catalog ready"
        );

        let events = Arc::new(EventLog::new());
        let sessions = Arc::new(SessionStore::new(
            catalog.clone(),
            events.clone(),
            config.state_scope,
        ));
        let transcoder = Arc::new(ImageTranscoder::new());
        let narrative = Arc::new(NarrativeService::new(
            catalog.clone(),
            sessions,
            events,
            transcoder,
        ));

        Ok(Self {
            content_root,
            config,
            catalog,
            narrative,
        })
    }
}
