//! novelgame - visual novel engine for narrator agents
//!
//! Usage:
//!   novelgame mcp                      Start MCP server on stdio
//!   novelgame stories                  List playable stories
//!   novelgame scene <story> [scene]    Show a scene
//!   novelgame check                    Validate the content tree
//!   novelgame image <story> <scene>    Transcode a scene image
//!   novelgame --help                   Show all commands

use anyhow::Result;
use clap::Parser;

use novelgame::cli::output::OutputMode;
use novelgame::cli::{Cli, Commands};
use novelgame::init::AppContext;
use novelgame::mcp::server::run_mcp_server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr (safe for MCP stdio transport)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("novelgame=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_flags(cli.json, cli.md);

    match &cli.command {
        Commands::Mcp => {
            let ctx = AppContext::new(cli.content_root.clone()).await?;
            run_mcp_server(ctx).await?;
        }
        cmd => {
            let ctx = AppContext::new(cli.content_root.clone()).await?;
            novelgame::cli::execute(cmd, &ctx, mode).await?;
        }
    }

    Ok(())
}
