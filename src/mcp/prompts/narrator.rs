//! System prompt for the narrator LLM that drives a playthrough.

use rmcp::model::{GetPromptResult, PromptMessage, PromptMessageRole};
use serde_json::{Map, Value};

pub const NARRATOR_PROMPT_NAME: &str = "narrator_prompt";
pub const DEFAULT_NARRATION_LANGUAGE: &str = "Japanese";

/// Build the narrator prompt. `language` picks the narration language.
pub fn get_narrator_prompt(args: Option<Map<String, Value>>) -> GetPromptResult {
    let language = args
        .as_ref()
        .and_then(|a| a.get("language"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_NARRATION_LANGUAGE);

    GetPromptResult {
        description: Some("Run the novel game as its narrator".to_string()),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "Run the novel game.\n\n\
                1. Call `list_stories`, pick a story and call `select_story` with the player's id.\n\
                2. Read the current scene with `get_story_state` and `get_scene`, then narrate it.\n\
                3. Offer the scene's choices. When the player picks one, call `choose` with the \
                current scene id, the choice id and any free text the player wrote.\n\
                4. Use `load_scene_image` to show the image of the current scene when one exists \
                (see `list_story_images`).\n\n\
                <Constraints>\n\
                - Speak {language}.\n\
                - Write vivid {language} prose (max 1000 chars per turn).\n\
                - Keep continuity with the existing story world and flags.\n\
                - Do not reveal hidden game mechanics or internal data.\n\
                </Constraints>"
            ),
        )],
    }
}
