//! Content catalog: the immutable, in-memory index of stories, scenes and
//! scene images.
//!
//! Built once at startup from a [`StoryDocumentSource`] and shared read-only
//! afterwards. Loading is tolerant: a broken `meta.yaml` gets a stub, a broken
//! scene is skipped, a story without scenes is hidden. Every such decision is
//! reported to the [`LoadSink`].

mod sink;
mod source;

pub use sink::{CollectingLoadSink, LoadIssue, LoadIssueKind, LoadSink, TracingLoadSink};
pub use source::{
    is_plain_id, yaml_to_json, SceneFile, StoryDocumentSource, YamlDirectorySource,
    IMAGE_EXTENSIONS, META_FILE, SCENE_EXTENSION,
};

use std::collections::HashMap;
use std::path::Path;

use crate::models::{stub_metadata, Metadata, Scene, Story, StorySummary};

/// Read-only index of every loaded story.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    stories: Vec<Story>,
    index: HashMap<String, usize>,
}

impl ContentCatalog {
    /// Build the catalog from the YAML tree below `content_root`.
    pub fn load(content_root: &Path, sink: &dyn LoadSink) -> Self {
        Self::build(&YamlDirectorySource::new(content_root), sink)
    }

    /// Build the catalog from any document source.
    pub fn build(source: &dyn StoryDocumentSource, sink: &dyn LoadSink) -> Self {
        let mut catalog = Self::default();

        let story_ids = match source.story_ids() {
            Ok(ids) => ids,
            Err(e) => {
                sink.record(LoadIssue {
                    story_id: None,
                    document: Some(e.path().to_path_buf()),
                    kind: LoadIssueKind::StoriesUnreadable(e.to_string()),
                });
                return catalog;
            }
        };

        for story_id in story_ids {
            let story = Self::load_story(source, sink, &story_id);
            if !story.has_scenes() {
                sink.record(LoadIssue::story(&story_id, LoadIssueKind::NoScenes));
            }
            catalog.insert(story);
        }

        tracing::info!(
            stories = catalog.stories.len(),
            playable = catalog.playable_count(),
            scenes = catalog.scene_count(),
            "Content catalog loaded"
        );
        catalog
    }

    fn load_story(source: &dyn StoryDocumentSource, sink: &dyn LoadSink, story_id: &str) -> Story {
        let meta = match source.read_meta(story_id) {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                sink.record(LoadIssue::story(story_id, LoadIssueKind::MissingMeta));
                stub_metadata(story_id)
            }
            Err(e) => {
                sink.record(LoadIssue::document(
                    story_id,
                    e.path(),
                    LoadIssueKind::InvalidMeta(e.to_string()),
                ));
                stub_metadata(story_id)
            }
        };

        let mut story = Story::new(story_id, meta);

        let files = match source.scene_files(story_id) {
            Ok(files) => files,
            Err(e) => {
                sink.record(LoadIssue::document(
                    story_id,
                    e.path(),
                    LoadIssueKind::SceneListing(e.to_string()),
                ));
                Vec::new()
            }
        };

        for file in files {
            let document = match source.read_scene(&file) {
                Ok(document) => document,
                Err(e) => {
                    sink.record(LoadIssue::document(
                        story_id,
                        &file.path,
                        LoadIssueKind::InvalidScene(e.to_string()),
                    ));
                    continue;
                }
            };

            let scene = Scene::from_document(document, &file.stem);
            if !is_plain_id(&scene.id) {
                sink.record(LoadIssue::document(
                    story_id,
                    &file.path,
                    LoadIssueKind::InvalidScene(format!(
                        "scene id '{}' must not contain path separators",
                        scene.id
                    )),
                ));
                continue;
            }
            if let Some(image) = source.image_path(story_id, &scene.id) {
                story.images.insert(scene.id.clone(), image);
            }
            if story.scenes.contains_key(&scene.id) {
                sink.record(LoadIssue::document(
                    story_id,
                    &file.path,
                    LoadIssueKind::DuplicateScene(scene.id.clone()),
                ));
            }
            story.scenes.insert(scene.id.clone(), scene);
        }

        story.seal();
        tracing::debug!(
            story_id,
            scenes = story.scenes.len(),
            images = story.images.len(),
            entry = story.entry_scene.as_deref().unwrap_or("-"),
            "Story loaded"
        );
        story
    }

    fn insert(&mut self, story: Story) {
        match self.index.get(&story.id) {
            Some(&i) => self.stories[i] = story,
            None => {
                self.index.insert(story.id.clone(), self.stories.len());
                self.stories.push(story);
            }
        }
    }

    /// Any story known to the catalog, including ones without scenes.
    pub fn story(&self, story_id: &str) -> Option<&Story> {
        self.index.get(story_id).map(|&i| &self.stories[i])
    }

    /// A story that can be played (has at least one scene).
    pub fn playable_story(&self, story_id: &str) -> Option<&Story> {
        self.story(story_id).filter(|s| s.has_scenes())
    }

    /// Stories with at least one scene, in load order.
    pub fn list_stories(&self) -> Vec<StorySummary> {
        self.stories
            .iter()
            .filter(|s| s.has_scenes())
            .map(|s| StorySummary {
                story_id: s.id.clone(),
                meta: s.meta.clone(),
            })
            .collect()
    }

    pub fn get_meta(&self, story_id: &str) -> Option<&Metadata> {
        self.story(story_id).map(|s| &s.meta)
    }

    pub fn get_scene(&self, story_id: &str, scene_id: &str) -> Option<&Scene> {
        self.story(story_id).and_then(|s| s.scenes.get(scene_id))
    }

    /// Scene ids that have an image, empty for unknown stories.
    pub fn list_image_scene_ids(&self, story_id: &str) -> Vec<String> {
        self.story(story_id)
            .map(|s| s.images.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn resolve_image_path(&self, story_id: &str, scene_id: &str) -> Option<&Path> {
        self.story(story_id)
            .and_then(|s| s.images.get(scene_id))
            .map(|p| p.as_path())
    }

    pub fn entry_scene(&self, story_id: &str) -> Option<&str> {
        self.story(story_id).and_then(|s| s.entry_scene.as_deref())
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    pub fn playable_count(&self) -> usize {
        self.stories.iter().filter(|s| s.has_scenes()).count()
    }

    pub fn scene_count(&self) -> usize {
        self.stories.iter().map(|s| s.scenes.len()).sum()
    }
}
