//! Diagnostics sink for catalog loading.
//!
//! The catalog builder never fails on a bad document. It reports one
//! `LoadIssue` per skipped or stubbed story/scene and keeps going; the sink
//! decides what to do with it (log it, collect it for the `check` command).

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// What went wrong while loading a story or scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "detail", rename_all = "snake_case")]
pub enum LoadIssueKind {
    /// The `stories/` directory could not be listed.
    StoriesUnreadable(String),
    /// No `meta.yaml`; a stub was used.
    MissingMeta,
    /// `meta.yaml` could not be read or parsed; a stub was used.
    InvalidMeta(String),
    /// The story directory could not be listed; the story has no scenes.
    SceneListing(String),
    /// A scene document was skipped.
    InvalidScene(String),
    /// Two documents resolved to the same scene id; the later one was kept.
    DuplicateScene(String),
    /// The story has no loadable scenes and is hidden from listings.
    NoScenes,
}

/// One structured record per skipped or stubbed story/scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,
    #[serde(flatten)]
    pub kind: LoadIssueKind,
}

impl LoadIssue {
    pub fn story(story_id: &str, kind: LoadIssueKind) -> Self {
        Self {
            story_id: Some(story_id.to_string()),
            document: None,
            kind,
        }
    }

    pub fn document(story_id: &str, document: impl Into<PathBuf>, kind: LoadIssueKind) -> Self {
        Self {
            story_id: Some(story_id.to_string()),
            document: Some(document.into()),
            kind,
        }
    }
}

impl fmt::Display for LoadIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadIssueKind::StoriesUnreadable(e) => write!(f, "stories directory unreadable: {}", e),
            LoadIssueKind::MissingMeta => write!(f, "no meta.yaml, using stub metadata"),
            LoadIssueKind::InvalidMeta(e) => write!(f, "invalid meta.yaml, using stub metadata: {}", e),
            LoadIssueKind::SceneListing(e) => write!(f, "could not list scenes: {}", e),
            LoadIssueKind::InvalidScene(e) => write!(f, "scene skipped: {}", e),
            LoadIssueKind::DuplicateScene(id) => {
                write!(f, "duplicate scene id '{}', later document wins", id)
            }
            LoadIssueKind::NoScenes => write!(f, "no scenes found, story hidden"),
        }
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.story_id, &self.document) {
            (Some(story), Some(doc)) => write!(f, "[{}] {}: {}", story, doc.display(), self.kind),
            (Some(story), None) => write!(f, "[{}] {}", story, self.kind),
            (None, Some(doc)) => write!(f, "{}: {}", doc.display(), self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

/// Receives catalog load issues.
pub trait LoadSink: Send + Sync {
    fn record(&self, issue: LoadIssue);
}

/// Logs each issue as a structured `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLoadSink;

impl LoadSink for TracingLoadSink {
    fn record(&self, issue: LoadIssue) {
        let story_id = issue.story_id.as_deref().unwrap_or("-");
        let document = issue
            .document
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        tracing::warn!(
            story_id,
            document = %document,
            issue = %issue.kind,
            "catalog load issue"
        );
    }
}

/// Keeps every issue in arrival order.
#[derive(Debug, Default, Clone)]
pub struct CollectingLoadSink {
    issues: Arc<Mutex<Vec<LoadIssue>>>,
}

impl CollectingLoadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issues(&self) -> Vec<LoadIssue> {
        self.issues
            .lock()
            .map(|issues| issues.clone())
            .unwrap_or_default()
    }
}

impl LoadSink for CollectingLoadSink {
    fn record(&self, issue: LoadIssue) {
        if let Ok(mut issues) = self.issues.lock() {
            issues.push(issue);
        }
    }
}
