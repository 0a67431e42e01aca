//! `image`: transcode a scene image and write it to disk.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::output::{output_json, print_kv, print_success, OutputMode};
use crate::init::AppContext;
use crate::services::tracing_progress;

pub async fn handle_image(
    ctx: &AppContext,
    story_id: &str,
    scene_id: &str,
    out: Option<PathBuf>,
    max_width: u32,
    max_height: u32,
    mode: OutputMode,
) -> Result<()> {
    let encoded = ctx
        .narrative
        .scene_image(story_id, scene_id, max_width, max_height, tracing_progress())
        .await?;

    let out = out.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}-{}.{}",
            story_id,
            scene_id,
            encoded.format.extension()
        ))
    });
    std::fs::write(&out, &encoded.bytes)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({
            "path": out,
            "mime_type": encoded.mime_type(),
            "width": encoded.width,
            "height": encoded.height,
            "bytes": encoded.bytes.len(),
            "quality": encoded.quality,
            "attempts": encoded.attempts,
        }));
        return Ok(());
    }

    print_success(&format!("Wrote {}", out.display()));
    print_kv("format", encoded.mime_type());
    print_kv("size", &format!("{}x{}", encoded.width, encoded.height));
    print_kv("bytes", &encoded.bytes.len().to_string());
    if let Some(quality) = encoded.quality {
        print_kv("quality", &quality.to_string());
    }
    print_kv("passes", &encoded.attempts.to_string());
    Ok(())
}
