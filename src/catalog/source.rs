//! Story document sources.
//!
//! A source knows where story documents live and how to parse them; the
//! catalog only sees story ids, metadata mappings and scene documents.

use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::models::{Metadata, SceneDocument};

/// Name of the per-story metadata document.
pub const META_FILE: &str = "meta.yaml";

/// Extension of scene documents.
pub const SCENE_EXTENSION: &str = "yaml";

/// Image extensions in lookup priority order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// A scene document located by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFile {
    pub path: PathBuf,
    /// Filename without extension, the fallback scene id.
    pub stem: String,
}

/// Yields story records for the catalog builder.
pub trait StoryDocumentSource {
    /// Story ids in scan order.
    fn story_ids(&self) -> Result<Vec<String>, LoadError>;

    /// Story metadata, `Ok(None)` if the story has no metadata document.
    fn read_meta(&self, story_id: &str) -> Result<Option<Metadata>, LoadError>;

    /// Scene documents of a story, in scan order.
    fn scene_files(&self, story_id: &str) -> Result<Vec<SceneFile>, LoadError>;

    fn read_scene(&self, file: &SceneFile) -> Result<SceneDocument, LoadError>;

    /// Absolute path of the scene image, if one exists.
    fn image_path(&self, story_id: &str, scene_id: &str) -> Option<PathBuf>;
}

/// Reads `stories/<story_id>/…` YAML documents below a content root.
#[derive(Debug, Clone)]
pub struct YamlDirectorySource {
    stories_dir: PathBuf,
}

impl YamlDirectorySource {
    pub fn new(content_root: impl AsRef<Path>) -> Self {
        Self {
            stories_dir: content_root.as_ref().join("stories"),
        }
    }

    fn story_dir(&self, story_id: &str) -> PathBuf {
        self.stories_dir.join(story_id)
    }

    fn read_to_string(path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn sorted_entries(dir: &Path) -> Result<Vec<std::fs::DirEntry>, LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = std::fs::read_dir(dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by_key(|e| e.file_name());
        Ok(entries)
    }
}

impl StoryDocumentSource for YamlDirectorySource {
    fn story_ids(&self) -> Result<Vec<String>, LoadError> {
        Ok(Self::sorted_entries(&self.stories_dir)?
            .into_iter()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect())
    }

    fn read_meta(&self, story_id: &str) -> Result<Option<Metadata>, LoadError> {
        let path = self.story_dir(story_id).join(META_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = Self::read_to_string(&path)?;
        let value: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(&text).map_err(|source| LoadError::Yaml {
                path: path.clone(),
                source,
            })?;
        match yaml_to_json(value) {
            serde_json::Value::Object(meta) => Ok(Some(meta)),
            other => Err(LoadError::Shape {
                path,
                message: format!("expected a mapping, got {}", json_kind(&other)),
            }),
        }
    }

    fn scene_files(&self, story_id: &str) -> Result<Vec<SceneFile>, LoadError> {
        Ok(Self::sorted_entries(&self.story_dir(story_id))?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SCENE_EXTENSION))
            .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(META_FILE))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.to_string();
                Some(SceneFile { path, stem })
            })
            .collect())
    }

    fn read_scene(&self, file: &SceneFile) -> Result<SceneDocument, LoadError> {
        let text = Self::read_to_string(&file.path)?;
        let value: serde_yaml_ng::Value =
            serde_yaml_ng::from_str(&text).map_err(|source| LoadError::Yaml {
                path: file.path.clone(),
                source,
            })?;
        if !value.is_mapping() {
            return Err(LoadError::Shape {
                path: file.path.clone(),
                message: "scene document must be a mapping".to_string(),
            });
        }
        serde_json::from_value(yaml_to_json(value)).map_err(|source| LoadError::Schema {
            path: file.path.clone(),
            source,
        })
    }

    fn image_path(&self, story_id: &str, scene_id: &str) -> Option<PathBuf> {
        if !is_plain_id(scene_id) {
            return None;
        }
        let images = self.story_dir(story_id).join("images");
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| images.join(format!("{}.{}", scene_id, ext)))
            .find(|p| p.is_file())
            .map(|p| std::path::absolute(&p).unwrap_or(p))
    }
}

/// Whether `id` can name a file: non-empty, no path separators, not `.`/`..`.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

/// Convert a YAML value to JSON. Non-string mapping keys are rendered as
/// strings and tags are dropped.
pub fn yaml_to_json(value: serde_yaml_ng::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    use serde_yaml_ng::Value as Yaml;

    match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Json::String(s),
        Yaml::Sequence(items) => Json::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Json::Object(
            map.into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => {
            let tagged = *tagged;
            yaml_to_json(tagged.value)
        }
    }
}

fn yaml_number(n: &serde_yaml_ng::Number) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        serde_json::Value::from(i)
    } else if let Some(u) = n.as_u64() {
        serde_json::Value::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn yaml_key(key: serde_yaml_ng::Value) -> String {
    use serde_yaml_ng::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml_ng::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "an empty document",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
