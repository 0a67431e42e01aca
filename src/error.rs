use std::path::PathBuf;

use thiserror::Error;

/// Error type for request-time narrative operations.
#[derive(Debug, Error)]
pub enum NovelError {
    /// Story is not in the catalog, or it has no loadable scenes.
    #[error("Unknown story_id or story has no scenes: {0}")]
    UnknownStory(String),

    /// Scene does not belong to the player's bound story.
    #[error("Invalid scene id '{scene_id}' for story '{story_id}'")]
    UnknownScene { story_id: String, scene_id: String },

    /// Player has not called select_story yet.
    #[error("Story not selected for player '{0}'. Call select_story first.")]
    NoStorySelected(String),

    /// No image is registered for the scene, or the file cannot be read/decoded.
    #[error("Image asset not found: {reason}")]
    AssetNotFound {
        story_id: Option<String>,
        scene_id: Option<String>,
        path: Option<PathBuf>,
        reason: String,
    },

    /// Image still exceeds the byte ceiling at minimum dimensions/quality.
    #[error(
        "Image is too large even after repeated resizing/compression: \
         {original_width}x{original_height} -> {final_width}x{final_height}, \
         {final_bytes} bytes (limit {limit})"
    )]
    SizeExceeded {
        original_width: u32,
        original_height: u32,
        final_width: u32,
        final_height: u32,
        final_bytes: usize,
        final_quality: Option<u8>,
        limit: usize,
    },

    /// Configuration could not be applied.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Encoding or worker failure not caused by the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NovelError {
    pub fn missing_image(story_id: &str, scene_id: &str) -> Self {
        NovelError::AssetNotFound {
            story_id: Some(story_id.to_string()),
            scene_id: Some(scene_id.to_string()),
            path: None,
            reason: format!("No image found for story={}, scene={}", story_id, scene_id),
        }
    }

    pub fn unreadable_image(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        NovelError::AssetNotFound {
            story_id: None,
            scene_id: None,
            reason: format!("{}: {}", path.display(), reason),
            path: Some(path),
        }
    }
}

/// Failure to load a single story or scene document at startup.
///
/// Never fatal: the catalog builder turns these into load issues and moves on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// YAML parsed but does not fit the scene document schema.
    #[error("Invalid document {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document parsed but has the wrong shape (e.g. not a mapping).
    #[error("Unexpected document shape in {path}: {message}")]
    Shape { path: PathBuf, message: String },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Yaml { path, .. }
            | LoadError::Schema { path, .. }
            | LoadError::Shape { path, .. } => path,
        }
    }
}
