//! Story progression state and player sessions.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::EventLog;
use crate::catalog::ContentCatalog;
use crate::error::NovelError;
use crate::models::{EventKind, PlayerSession, Scene, StoryState};

/// Acknowledgement returned by [`SessionStore::record_choice`].
pub const CHOICE_ACK: &str = "ok";

/// Who a story's progression state belongs to.
/// Parsed the same way from `novelgame.toml` and `NOVELGAME_STATE_SCOPE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StateScope {
    /// One state per story, shared by every player of that story.
    #[default]
    Shared,
    /// One state per (story, player).
    Player,
}

impl std::str::FromStr for StateScope {
    type Err = NovelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(StateScope::Shared),
            "player" => Ok(StateScope::Player),
            other => Err(NovelError::Config(format!(
                "Invalid state scope '{}': expected 'shared' or 'player'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for StateScope {
    type Error = NovelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Result of selecting a story.
#[derive(Debug, Clone)]
pub struct SelectedStory {
    pub story_id: String,
    pub scene_id: String,
    pub scene: Scene,
}

/// Mutable progression state of one story.
#[derive(Debug, Default)]
struct StorySlot {
    shared: Option<StoryState>,
    by_player: HashMap<String, StoryState>,
}

impl StorySlot {
    fn get(&self, scope: StateScope, player_id: Option<&str>) -> Option<&StoryState> {
        match scope {
            StateScope::Shared => self.shared.as_ref(),
            StateScope::Player => player_id.and_then(|p| self.by_player.get(p)),
        }
    }

    fn get_or_init(&mut self, scope: StateScope, player_id: &str, entry_scene: &str) -> &StoryState {
        match scope {
            StateScope::Shared => self
                .shared
                .get_or_insert_with(|| StoryState::starting_at(entry_scene)),
            StateScope::Player => self
                .by_player
                .entry(player_id.to_string())
                .or_insert_with(|| StoryState::starting_at(entry_scene)),
        }
    }
}

/// Tracks which story each player is in and where each story stands.
///
/// Mutated only through [`select_story`](Self::select_story) and
/// [`record_choice`](Self::record_choice). Both take the story's own lock
/// before touching player sessions and the event log, so two players of the
/// same story are serialized while different stories never contend.
pub struct SessionStore {
    catalog: Arc<ContentCatalog>,
    events: Arc<EventLog>,
    scope: StateScope,
    slots: RwLock<HashMap<String, Arc<Mutex<StorySlot>>>>,
    players: RwLock<HashMap<String, PlayerSession>>,
}

impl SessionStore {
    pub fn new(catalog: Arc<ContentCatalog>, events: Arc<EventLog>, scope: StateScope) -> Self {
        Self {
            catalog,
            events,
            scope,
            slots: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> StateScope {
        self.scope
    }

    async fn slot(&self, story_id: &str) -> Arc<Mutex<StorySlot>> {
        if let Some(slot) = self.slots.read().await.get(story_id) {
            return slot.clone();
        }
        self.slots
            .write()
            .await
            .entry(story_id.to_string())
            .or_default()
            .clone()
    }

    /// Bind `player_id` to `story_id` and return the story's current scene.
    ///
    /// Clears the player's visited path and logs a `start` event. The story
    /// state is created at the entry scene on first selection.
    pub async fn select_story(
        &self,
        player_id: &str,
        story_id: &str,
    ) -> Result<SelectedStory, NovelError> {
        let story = self
            .catalog
            .playable_story(story_id)
            .ok_or_else(|| NovelError::UnknownStory(story_id.to_string()))?;
        let entry_scene = story
            .entry_scene
            .as_deref()
            .ok_or_else(|| NovelError::UnknownStory(story_id.to_string()))?;

        let slot = self.slot(story_id).await;
        let mut slot = slot.lock().await;
        let scene_id = slot
            .get_or_init(self.scope, player_id, entry_scene)
            .scene_id
            .clone();

        {
            let mut players = self.players.write().await;
            let session = players.entry(player_id.to_string()).or_default();
            session.current_story_id = Some(story_id.to_string());
            session.path.clear();
        }

        self.events
            .append(
                story_id,
                EventKind::Start {
                    player_id: player_id.to_string(),
                },
            )
            .await;
        drop(slot);

        let scene = story
            .scenes
            .get(&scene_id)
            .cloned()
            .ok_or_else(|| NovelError::UnknownScene {
                story_id: story_id.to_string(),
                scene_id: scene_id.clone(),
            })?;

        tracing::info!(player_id, story_id, scene_id = %scene_id, "Story selected");
        Ok(SelectedStory {
            story_id: story_id.to_string(),
            scene_id,
            scene,
        })
    }

    /// Record a choice made in `current_scene_id` of the player's story.
    ///
    /// Undeclared choice ids are logged and accepted; the narrator may
    /// improvise options. The story state is not advanced.
    pub async fn record_choice(
        &self,
        player_id: &str,
        current_scene_id: &str,
        choice_id: &str,
        free_text: Option<&str>,
    ) -> Result<&'static str, NovelError> {
        let story_id = self
            .current_story(player_id)
            .await
            .ok_or_else(|| NovelError::NoStorySelected(player_id.to_string()))?;

        let scene = self
            .catalog
            .get_scene(&story_id, current_scene_id)
            .ok_or_else(|| NovelError::UnknownScene {
                story_id: story_id.clone(),
                scene_id: current_scene_id.to_string(),
            })?;

        if !scene.offers_choice(choice_id) {
            tracing::warn!(
                player_id,
                story_id = %story_id,
                scene_id = current_scene_id,
                choice_id,
                "Potentially invalid choice_id for scene"
            );
        }

        let slot = self.slot(&story_id).await;
        let _guard = slot.lock().await;

        {
            let mut players = self.players.write().await;
            let session = players
                .get_mut(player_id)
                .filter(|s| s.current_story_id.is_some())
                .ok_or_else(|| NovelError::NoStorySelected(player_id.to_string()))?;
            // Rebound to another story while waiting for the slot.
            if let Some(bound) = session.current_story_id.as_deref().filter(|b| *b != story_id) {
                return Err(NovelError::UnknownScene {
                    story_id: bound.to_string(),
                    scene_id: current_scene_id.to_string(),
                });
            }
            session.path.push(current_scene_id.to_string());
        }

        self.events
            .append(
                &story_id,
                EventKind::Choice {
                    player_id: player_id.to_string(),
                    current: current_scene_id.to_string(),
                    choice: choice_id.to_string(),
                    free: free_text.map(str::to_string),
                },
            )
            .await;

        tracing::debug!(player_id, story_id = %story_id, choice_id, "Choice recorded");
        Ok(CHOICE_ACK)
    }

    /// Progression state of a playable story.
    ///
    /// Before anyone selects the story this is the initial state at the entry
    /// scene; reading it does not create it. With player-scoped state,
    /// `player_id` picks whose state to read.
    pub async fn story_state(&self, story_id: &str, player_id: Option<&str>) -> Option<StoryState> {
        let entry_scene = self.catalog.playable_story(story_id)?.entry_scene.clone()?;

        let slot = self.slots.read().await.get(story_id).cloned();
        if let Some(slot) = slot {
            if let Some(state) = slot.lock().await.get(self.scope, player_id) {
                return Some(state.clone());
            }
        }
        Some(StoryState::starting_at(entry_scene))
    }

    pub async fn current_story(&self, player_id: &str) -> Option<String> {
        self.players
            .read()
            .await
            .get(player_id)
            .and_then(|s| s.current_story_id.clone())
    }

    /// Visited scenes of the player's current playthrough.
    pub async fn player_path(&self, player_id: &str) -> Vec<String> {
        self.players
            .read()
            .await
            .get(player_id)
            .map(|s| s.path.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CollectingLoadSink;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn store(scope: StateScope) -> (TempDir, SessionStore, Arc<EventLog>) {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "stories/rain/intro.yaml",
            "body: Rain falls.\nchoices:\n  - id: wait\n    label: Wait\n  - id: run\n    label: Run\n",
        );
        write(tmp.path(), "stories/rain/street.yaml", "body: A street.");
        write(tmp.path(), "stories/sun/a.yaml", "body: Sun.");
        write(tmp.path(), "stories/empty/meta.yaml", "title: Empty");
        let catalog = Arc::new(ContentCatalog::load(tmp.path(), &CollectingLoadSink::new()));
        let events = Arc::new(EventLog::new());
        let store = SessionStore::new(catalog, events.clone(), scope);
        (tmp, store, events)
    }

    #[tokio::test]
    async fn test_select_returns_entry_scene_and_logs_start() {
        let (_tmp, store, events) = store(StateScope::Shared);
        let selected = store.select_story("p1", "rain").await.unwrap();
        assert_eq!(selected.scene_id, "intro");
        assert_eq!(selected.scene.body.as_deref(), Some("Rain falls."));

        let log = events.read("rain").await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind.name(), "start");
        assert_eq!(store.current_story("p1").await.as_deref(), Some("rain"));
    }

    #[tokio::test]
    async fn test_select_unknown_or_empty_story_fails() {
        let (_tmp, store, events) = store(StateScope::Shared);
        assert!(matches!(
            store.select_story("p1", "ghost").await,
            Err(NovelError::UnknownStory(_))
        ));
        assert!(matches!(
            store.select_story("p1", "empty").await,
            Err(NovelError::UnknownStory(_))
        ));
        assert!(events.read("empty").await.is_empty());
        assert!(store.current_story("p1").await.is_none());
    }

    #[tokio::test]
    async fn test_choose_before_select_fails() {
        let (_tmp, store, _) = store(StateScope::Shared);
        let result = store.record_choice("p1", "intro", "wait", None).await;
        assert!(matches!(result, Err(NovelError::NoStorySelected(p)) if p == "p1"));
    }

    #[tokio::test]
    async fn test_choose_unknown_scene_fails() {
        let (_tmp, store, events) = store(StateScope::Shared);
        store.select_story("p1", "rain").await.unwrap();
        let result = store.record_choice("p1", "a", "x", None).await;
        assert!(matches!(result, Err(NovelError::UnknownScene { .. })));
        assert_eq!(events.len("rain").await, 1);
        assert!(store.player_path("p1").await.is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_choice_is_accepted() {
        let (_tmp, store, events) = store(StateScope::Shared);
        store.select_story("p1", "rain").await.unwrap();
        let ack = store
            .record_choice("p1", "intro", "dance", Some("I dance in the rain"))
            .await
            .unwrap();
        assert_eq!(ack, CHOICE_ACK);
        let log = events.read("rain").await;
        assert_eq!(log.len(), 2);
        match &log[1].kind {
            EventKind::Choice { choice, free, current, .. } => {
                assert_eq!(choice, "dance");
                assert_eq!(current, "intro");
                assert_eq!(free.as_deref(), Some("I dance in the rain"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_choice_does_not_advance_state() {
        let (_tmp, store, _) = store(StateScope::Shared);
        store.select_story("p1", "rain").await.unwrap();
        store.record_choice("p1", "intro", "run", None).await.unwrap();
        store.record_choice("p1", "street", "any", None).await.unwrap();
        let state = store.story_state("rain", None).await.unwrap();
        assert_eq!(state.scene_id, "intro");
        assert_eq!(store.player_path("p1").await, vec!["intro", "street"]);
    }

    #[tokio::test]
    async fn test_reselect_clears_path() {
        let (_tmp, store, _) = store(StateScope::Shared);
        store.select_story("p1", "rain").await.unwrap();
        store.record_choice("p1", "intro", "run", None).await.unwrap();
        store.select_story("p1", "rain").await.unwrap();
        assert!(store.player_path("p1").await.is_empty());

        store.record_choice("p1", "intro", "run", None).await.unwrap();
        store.select_story("p1", "sun").await.unwrap();
        assert!(store.player_path("p1").await.is_empty());
        assert_eq!(store.current_story("p1").await.as_deref(), Some("sun"));
    }

    #[tokio::test]
    async fn test_state_readable_before_selection() {
        let (_tmp, store, _) = store(StateScope::Shared);
        let state = store.story_state("sun", None).await.unwrap();
        assert_eq!(state.scene_id, "a");
        assert!(state.flags.is_empty());
        assert!(state.summary.is_empty());
        assert!(store.story_state("empty", None).await.is_none());
        assert!(store.story_state("ghost", None).await.is_none());
    }

    #[tokio::test]
    async fn test_player_scope_keeps_states_apart() {
        let (_tmp, store, _) = store(StateScope::Player);
        store.select_story("p1", "rain").await.unwrap();
        store.select_story("p2", "rain").await.unwrap();
        assert_eq!(store.scope(), StateScope::Player);
        assert_eq!(
            store.story_state("rain", Some("p1")).await.unwrap().scene_id,
            "intro"
        );
        assert_eq!(
            store.story_state("rain", Some("p3")).await.unwrap().scene_id,
            "intro"
        );
    }

    #[test]
    fn test_state_scope_parsing() {
        assert_eq!("shared".parse::<StateScope>().unwrap(), StateScope::Shared);
        assert_eq!(" Player ".parse::<StateScope>().unwrap(), StateScope::Player);
        assert!("global".parse::<StateScope>().is_err());
        assert!("story".parse::<StateScope>().is_err());
    }

    #[test]
    fn test_state_scope_file_and_env_agree() {
        #[derive(Deserialize)]
        struct Holder {
            scope: StateScope,
        }

        for raw in ["shared", "player", "Player", "story", ""] {
            let from_env = raw.parse::<StateScope>().ok();
            let from_file = toml::from_str::<Holder>(&format!("scope = \"{}\"", raw))
                .ok()
                .map(|h| h.scope);
            assert_eq!(from_env, from_file, "{raw:?}");
        }
    }

    #[tokio::test]
    async fn test_choice_racing_reselect_is_rejected() {
        let (_tmp, store, events) = store(StateScope::Shared);
        let store = Arc::new(store);
        store.select_story("p1", "rain").await.unwrap();

        // Hold the rain slot so the choice stalls after validating its scene.
        let slot = store.slot("rain").await;
        let held = slot.lock().await;
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.record_choice("p1", "intro", "wait", None).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        store.select_story("p1", "sun").await.unwrap();
        drop(held);

        let result = pending.await.unwrap();
        assert!(matches!(
            result,
            Err(NovelError::UnknownScene { ref story_id, .. }) if story_id == "sun"
        ));
        assert!(store.player_path("p1").await.is_empty());
        assert_eq!(events.len("rain").await, 1);
        assert_eq!(events.len("sun").await, 1);
    }
}
