//! Scene documents and their choices.
//!
//! A scene is one narrative unit of a story: a Markdown `body`, an optional
//! ordered list of `choices`, and whatever extra fields the author put in the
//! YAML document. Extra fields are kept verbatim so the narrator sees the
//! document as written.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Metadata;

/// Scene type recorded for scenes loaded from disk.
pub const PRESET_SCENE_TYPE: &str = "preset";

fn default_scene_type() -> String {
    PRESET_SCENE_TYPE.to_string()
}

/// Scalar document keys (`id: intro`, `id: 3`, `id: 1.5`) rendered as strings.
fn key_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn de_optional_key<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => key_to_string(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a scalar id, got {}", value))),
    }
}

/// A selectable option offered by a scene.
///
/// Choice ids are unique within their scene only. Nothing links a choice to a
/// target scene; branching is up to the narrator. A choice without an `id`
/// is kept for display but can never be matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(
        default,
        deserialize_with = "de_optional_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// Raw scene document as it appears in `<scene_id>.yaml`.
#[derive(Debug, Deserialize)]
pub struct SceneDocument {
    /// Overrides the filename stem as scene id.
    #[serde(default, deserialize_with = "de_optional_key")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_scene_type")]
    pub scene_type: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(flatten)]
    pub extra: Metadata,
}

/// A loaded scene. Immutable once the catalog is built.
///
/// Serializes to the scene document minus its `id`, which is the catalog key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "type")]
    pub scene_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Scene {
    /// Build a scene from its document, falling back to `file_stem` for the id.
    pub fn from_document(document: SceneDocument, file_stem: &str) -> Self {
        Self {
            id: document.id.unwrap_or_else(|| file_stem.to_string()),
            scene_type: document.scene_type,
            body: document.body,
            choices: document.choices,
            extra: document.extra,
        }
    }

    /// Whether the scene document has a `choices` key at all.
    pub fn declares_choices(&self) -> bool {
        self.choices.is_some()
    }

    /// Whether `choice_id` is one of the declared choices.
    ///
    /// Scenes without a `choices` key accept anything.
    pub fn offers_choice(&self, choice_id: &str) -> bool {
        match &self.choices {
            Some(choices) => choices.iter().any(|c| c.id.as_deref() == Some(choice_id)),
            None => true,
        }
    }

    /// The scene as a JSON document, as served to the narrator.
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}
