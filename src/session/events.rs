//! Append-only event log, one sequence per story.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Event, EventKind};

type StoryLog = Arc<Mutex<Vec<Event>>>;

/// Chronological record of start/choice events per story.
///
/// Each story's sequence has its own lock, so appends to one story never wait
/// on another. Entries are never mutated or removed.
#[derive(Debug, Default)]
pub struct EventLog {
    logs: RwLock<HashMap<String, StoryLog>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn story_log(&self, story_id: &str) -> StoryLog {
        if let Some(log) = self.logs.read().await.get(story_id) {
            return log.clone();
        }
        self.logs
            .write()
            .await
            .entry(story_id.to_string())
            .or_default()
            .clone()
    }

    /// Append an event stamped with the current time.
    ///
    /// Timestamps never go backwards within a story: if the wall clock steps
    /// back, the previous entry's timestamp is reused.
    pub async fn append(&self, story_id: &str, kind: EventKind) -> Event {
        let log = self.story_log(story_id).await;
        let mut log = log.lock().await;

        let now = Utc::now();
        let ts = log.last().map_or(now, |last| last.ts.max(now));
        let event = Event { ts, kind };
        log.push(event.clone());

        tracing::debug!(story_id, event = event.kind.name(), seq = log.len(), "Event appended");
        event
    }

    /// All events of a story in append order; empty for unknown stories.
    pub async fn read(&self, story_id: &str) -> Vec<Event> {
        let log = self.logs.read().await.get(story_id).cloned();
        match log {
            Some(log) => log.lock().await.clone(),
            None => Vec::new(),
        }
    }

    pub async fn len(&self, story_id: &str) -> usize {
        let log = self.logs.read().await.get(story_id).cloned();
        match log {
            Some(log) => log.lock().await.len(),
            None => 0,
        }
    }
}
