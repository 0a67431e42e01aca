//! Story event log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A narrative-affecting action, appended to its story's log.
///
/// Serialized as `{"ts": ..., "event": "start"|"choice", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    /// A player selected (or re-selected) the story.
    Start { player_id: String },
    /// A player made a choice in a scene.
    Choice {
        player_id: String,
        current: String,
        choice: String,
        free: Option<String>,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Start { .. } => "start",
            EventKind::Choice { .. } => "choice",
        }
    }

    pub fn player_id(&self) -> &str {
        match self {
            EventKind::Start { player_id } | EventKind::Choice { player_id, .. } => player_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_event_wire_shape() {
        let event = Event {
            ts: Utc::now(),
            kind: EventKind::Choice {
                player_id: "p1".into(),
                current: "intro".into(),
                choice: "left".into(),
                free: None,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "choice");
        assert_eq!(json["payload"]["player_id"], "p1");
        assert_eq!(json["payload"]["current"], "intro");
        assert_eq!(json["payload"]["choice"], "left");
        assert!(json["payload"]["free"].is_null());
        assert!(json["ts"].is_string());
    }

    #[test]
    fn test_start_event_round_trips() {
        let event = Event {
            ts: Utc::now(),
            kind: EventKind::Start {
                player_id: "p2".into(),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind.name(), "start");
        assert_eq!(back.kind.player_id(), "p2");
    }
}
