pub mod event;
pub mod scene;
pub mod state;
pub mod story;

/// Open-ended string-keyed document fields (story metadata, scene extras, flags).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

pub use event::{Event, EventKind};
pub use scene::{Choice, Scene, SceneDocument, PRESET_SCENE_TYPE};
pub use state::{PlayerSession, StoryState};
pub use story::{resolve_entry_scene, stub_metadata, Story, StorySummary, INTRO_SCENE_ID};
