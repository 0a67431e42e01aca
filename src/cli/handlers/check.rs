//! `check`: reload the content tree and report every load issue.

use anyhow::Result;

use crate::catalog::{CollectingLoadSink, ContentCatalog};
use crate::cli::output::{
    output_json, print_header, print_success, print_table, print_warning, OutputMode,
};
use crate::init::AppContext;

pub async fn handle_check(ctx: &AppContext, strict: bool, mode: OutputMode) -> Result<()> {
    let root = ctx.content_root.clone();
    let (catalog, issues) = tokio::task::spawn_blocking(move || {
        let sink = CollectingLoadSink::new();
        let catalog = ContentCatalog::load(&root, &sink);
        (catalog, sink.issues())
    })
    .await?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({
            "content_root": ctx.content_root,
            "stories": catalog.story_count(),
            "playable": catalog.playable_count(),
            "scenes": catalog.scene_count(),
            "issues": issues,
        }));
    } else {
        print_header(mode, &format!("Content check: {}", ctx.content_root.display()));
        println!(
            "  {} stories ({} playable), {} scenes",
            catalog.story_count(),
            catalog.playable_count(),
            catalog.scene_count()
        );
        if issues.is_empty() {
            print_success("No issues found");
        } else {
            let rows = issues
                .iter()
                .map(|issue| {
                    vec![
                        issue.story_id.clone().unwrap_or_else(|| "-".to_string()),
                        issue
                            .document
                            .as_ref()
                            .map(|d| d.display().to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        issue.kind.to_string(),
                    ]
                })
                .collect();
            print_table(mode, &["Story", "Document", "Issue"], rows);
            print_warning(&format!("{} issue(s) found", issues.len()));
        }
    }

    if strict && !issues.is_empty() {
        anyhow::bail!("{} content issue(s) found", issues.len());
    }
    Ok(())
}
