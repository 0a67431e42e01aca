//! Story and scene browsing.

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::cli::output::{
    output_json, print_header, print_hint, print_kv, print_table, OutputMode,
};
use crate::init::AppContext;

fn meta_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn handle_stories(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let stories = ctx.narrative.list_stories();

    if mode == OutputMode::Json {
        output_json(&stories);
        return Ok(());
    }

    let rows = stories
        .iter()
        .map(|summary| {
            let (scenes, images) = ctx
                .catalog
                .story(&summary.story_id)
                .map(|s| (s.scenes.len(), s.images.len()))
                .unwrap_or_default();
            vec![
                summary.story_id.clone(),
                meta_text(summary.meta.get("title")),
                meta_text(summary.meta.get("author")),
                meta_text(summary.meta.get("language")),
                scenes.to_string(),
                images.to_string(),
            ]
        })
        .collect();

    print_header(mode, &format!("Stories ({})", stories.len()));
    print_table(
        mode,
        &["Story", "Title", "Author", "Language", "Scenes", "Images"],
        rows,
    );
    Ok(())
}

pub fn handle_scene(
    ctx: &AppContext,
    story_id: &str,
    scene_id: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let scene_id = match scene_id {
        Some(id) => id.to_string(),
        None => ctx
            .catalog
            .entry_scene(story_id)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Story '{}' not found or has no scenes", story_id))?,
    };

    let scene = ctx
        .narrative
        .get_scene(story_id, &scene_id)
        .ok_or_else(|| anyhow::anyhow!("Scene '{}' not found in story '{}'", scene_id, story_id))?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({
            "story_id": story_id,
            "scene_id": scene_id,
            "scene": scene.to_document(),
        }));
        return Ok(());
    }

    print_header(mode, &format!("{} / {}", story_id, scene_id));
    print_kv("type", &scene.scene_type);
    if ctx.catalog.resolve_image_path(story_id, &scene_id).is_some() {
        print_kv("image", "yes");
    }
    for (key, value) in &scene.extra {
        print_kv(key, &meta_text(Some(value)));
    }

    match &scene.body {
        Some(body) => println!("\n{}\n", body.trim_end()),
        None => println!("\n{}\n", "(no body)".dimmed()),
    }

    match &scene.choices {
        Some(choices) => {
            let rows = choices
                .iter()
                .map(|c| vec![c.id.clone().unwrap_or_else(|| "-".to_string()), c.label.clone()])
                .collect();
            print_table(mode, &["Choice", "Label"], rows);
        }
        None => print_hint("This scene declares no choices."),
    }
    Ok(())
}
