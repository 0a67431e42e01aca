//! Stories as held by the catalog.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::{Metadata, Scene};

/// Scene id every story prefers as its opening scene.
pub const INTRO_SCENE_ID: &str = "intro";

/// Metadata used when `meta.yaml` is missing or unreadable.
pub fn stub_metadata(story_id: &str) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("title".to_string(), serde_json::Value::from(story_id));
    meta
}

/// Pick the opening scene: `intro` if present, else the smallest scene id.
pub fn resolve_entry_scene<'a, I>(scene_ids: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut smallest: Option<&str> = None;
    for id in scene_ids {
        if id == INTRO_SCENE_ID {
            return Some(id);
        }
        match smallest {
            Some(s) if s <= id => {}
            _ => smallest = Some(id),
        }
    }
    smallest
}

/// A story with its scenes and image index.
#[derive(Debug, Clone)]
pub struct Story {
    pub id: String,
    pub meta: Metadata,
    pub scenes: BTreeMap<String, Scene>,
    pub images: BTreeMap<String, PathBuf>,
    pub entry_scene: Option<String>,
}

impl Story {
    pub fn new(id: impl Into<String>, meta: Metadata) -> Self {
        Self {
            id: id.into(),
            meta,
            scenes: BTreeMap::new(),
            images: BTreeMap::new(),
            entry_scene: None,
        }
    }

    /// Fix the entry scene once all scenes are in.
    pub fn seal(&mut self) {
        self.entry_scene =
            resolve_entry_scene(self.scenes.keys().map(String::as_str)).map(str::to_string);
    }

    pub fn has_scenes(&self) -> bool {
        !self.scenes.is_empty()
    }
}

/// Public listing entry: `story_id` followed by the metadata fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub story_id: String,
    #[serde(flatten)]
    pub meta: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intro_wins() {
        assert_eq!(resolve_entry_scene(["intro", "a", "b"]), Some("intro"));
        assert_eq!(resolve_entry_scene(["a", "b", "intro"]), Some("intro"));
    }

    #[test]
    fn test_smallest_id_without_intro() {
        assert_eq!(resolve_entry_scene(["b", "a"]), Some("a"));
    }

    #[test]
    fn test_no_scenes_no_entry() {
        assert_eq!(resolve_entry_scene(std::iter::empty()), None);
    }

    #[test]
    fn test_ordering_is_bytewise() {
        assert_eq!(resolve_entry_scene(["b", "B", "a"]), Some("B"));
        assert_eq!(resolve_entry_scene(["10", "9"]), Some("10"));
    }

    #[test]
    fn test_stub_metadata_uses_story_id_as_title() {
        let meta = stub_metadata("lost_letter");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta["title"], "lost_letter");
    }

    #[test]
    fn test_summary_flattens_metadata() {
        let mut meta = Metadata::new();
        meta.insert("title".into(), "Rain".into());
        meta.insert("language".into(), "ja".into());
        let summary = StorySummary {
            story_id: "rain".into(),
            meta,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["story_id"], "rain");
        assert_eq!(json["title"], "Rain");
        assert_eq!(json["language"], "ja");
    }

    proptest! {
        #[test]
        fn prop_entry_is_member_and_minimal(ids in proptest::collection::btree_set("[a-z]{1,6}", 1..12)) {
            let entry = resolve_entry_scene(ids.iter().map(String::as_str)).unwrap();
            prop_assert!(ids.contains(entry));
            if ids.contains(INTRO_SCENE_ID) {
                prop_assert_eq!(entry, INTRO_SCENE_ID);
            } else {
                prop_assert_eq!(Some(entry), ids.iter().next().map(String::as_str));
            }
        }
    }
}
