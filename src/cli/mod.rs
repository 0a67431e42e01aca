//! CLI interface for novelgame.

pub mod handlers;
pub mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use output::OutputMode;

/// novelgame - visual novel engine for narrator agents
#[derive(Parser)]
#[command(name = "novelgame", version, about, long_about = None)]
pub struct Cli {
    /// Directory containing `stories/` (default: ./ if it has stories/, else ~/.novelgame)
    #[arg(long, env = "NOVELGAME_CONTENT_ROOT", global = true)]
    pub content_root: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    /// Output as Markdown
    #[arg(long, global = true)]
    pub md: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start MCP server (stdio transport)
    Mcp,

    /// List playable stories
    #[command(alias = "ls")]
    Stories,

    /// Show a scene (defaults to the story's entry scene)
    Scene {
        /// Story id
        story: String,
        /// Scene id
        scene: Option<String>,
    },

    /// Load the content tree and report problems
    Check {
        /// Exit with an error if any issue was found
        #[arg(long)]
        strict: bool,
    },

    /// Transcode a scene image under the 1 MiB limit
    Image {
        /// Story id
        story: String,
        /// Scene id
        scene: String,
        /// Write the encoded image here (default: <story>-<scene>.<ext>)
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Bounding box width
        #[arg(long)]
        max_width: Option<u32>,
        /// Bounding box height
        #[arg(long)]
        max_height: Option<u32>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

/// Execute a CLI command.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Mcp => unreachable!("MCP handled in main"),

        Commands::Stories => handlers::story::handle_stories(ctx, mode)?,

        Commands::Scene { story, scene } => {
            handlers::story::handle_scene(ctx, story, scene.as_deref(), mode)?
        }

        Commands::Check { strict } => handlers::check::handle_check(ctx, *strict, mode).await?,

        Commands::Image {
            story,
            scene,
            out,
            max_width,
            max_height,
        } => {
            handlers::image::handle_image(
                ctx,
                story,
                scene,
                out.clone(),
                max_width.unwrap_or(ctx.config.max_width),
                max_height.unwrap_or(ctx.config.max_height),
                mode,
            )
            .await?
        }

        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "novelgame",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
