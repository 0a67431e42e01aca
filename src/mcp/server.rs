use std::sync::Arc;

use rmcp::{
    handler::server::tool::ToolRouter,
    handler::server::wrapper::{Json, Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, Peer, RoleServer, ServerHandler,
    ServiceExt,
};
use tracing::instrument;

use crate::mcp::error::ToolError;
use crate::mcp::progress::make_mcp_progress;
use crate::mcp::prompts::{get_narrator_prompt, NARRATOR_PROMPT_NAME};
use crate::mcp::resources::{render_resource, NovelResource, SCHEME};
use crate::mcp::{
    ChooseInput, LoadSceneImageInput, PlayerInput, PlayerPathResponse, SceneInput, SceneResponse,
    SelectStoryInput, SelectStoryResponse, StoryImagesResponse, StoryInput, StoryListResponse,
    StoryLogResponse, StoryMetaResponse, StoryStateInput, StoryStateResponse,
};
use crate::services::NarrativeService;

/// MCP server for the novel game.
#[derive(Clone)]
pub struct NovelServer {
    pub(crate) narrative: Arc<NarrativeService>,
    pub(crate) default_max_width: u32,
    pub(crate) default_max_height: u32,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl NovelServer {
    pub fn new(narrative: Arc<NarrativeService>, default_max_width: u32, default_max_height: u32) -> Self {
        Self {
            narrative,
            default_max_width,
            default_max_height,
            tool_router: Self::tool_router(),
        }
    }

    // ==========================================================================
    // MCP TOOLS (10 total) - All #[tool] methods must be in this impl block.
    // Implementation details in tools/*.rs files
    // ==========================================================================

    #[tool(description = "List playable stories with their metadata (title, author, language).")]
    #[instrument(name = "mcp.list_stories", skip_all)]
    pub async fn list_stories(&self) -> Result<Json<StoryListResponse>, ToolError> {
        self.handle_list_stories()
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "Get a story's metadata. Empty for unknown stories.")]
    #[instrument(name = "mcp.get_story_meta", skip_all)]
    pub async fn get_story_meta(
        &self,
        request: Parameters<StoryInput>,
    ) -> Result<Json<StoryMetaResponse>, ToolError> {
        self.handle_get_story_meta(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(
        description = "Get a story's progression state: current scene_id, flags and summary. Pass player_id when the server keeps per-player state."
    )]
    #[instrument(name = "mcp.get_story_state", skip_all)]
    pub async fn get_story_state(
        &self,
        request: Parameters<StoryStateInput>,
    ) -> Result<Json<StoryStateResponse>, ToolError> {
        self.handle_get_story_state(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "List the scene ids of a story that have an image.")]
    #[instrument(name = "mcp.list_story_images", skip_all)]
    pub async fn list_story_images(
        &self,
        request: Parameters<StoryInput>,
    ) -> Result<Json<StoryImagesResponse>, ToolError> {
        self.handle_list_story_images(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "Get a scene document (body, choices, type and extra fields).")]
    #[instrument(name = "mcp.get_scene", skip_all)]
    pub async fn get_scene(
        &self,
        request: Parameters<SceneInput>,
    ) -> Result<Json<SceneResponse>, ToolError> {
        self.handle_get_scene(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "Get the scenes a player has chosen in since their last select_story.")]
    #[instrument(name = "mcp.get_player_path", skip_all)]
    pub async fn get_player_path(
        &self,
        request: Parameters<PlayerInput>,
    ) -> Result<Json<PlayerPathResponse>, ToolError> {
        self.handle_get_player_path(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "Get a story's event log (start and choice events, oldest first).")]
    #[instrument(name = "mcp.get_story_log", skip_all)]
    pub async fn get_story_log(
        &self,
        request: Parameters<StoryInput>,
    ) -> Result<Json<StoryLogResponse>, ToolError> {
        self.handle_get_story_log(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(
        description = "Bind a story to the player and return its current scene. Resets the player's path."
    )]
    #[instrument(name = "mcp.select_story", skip_all)]
    pub async fn select_story(
        &self,
        request: Parameters<SelectStoryInput>,
    ) -> Result<Json<SelectStoryResponse>, ToolError> {
        self.handle_select_story(request)
            .await
            .map(Json)
            .map_err(ToolError::from)
    }

    #[tool(description = "Record the player's choice in the current scene of their selected story.")]
    #[instrument(name = "mcp.choose", skip_all)]
    pub async fn choose(&self, request: Parameters<ChooseInput>) -> Result<String, ToolError> {
        self.handle_choose(request).await.map_err(ToolError::from)
    }

    #[tool(
        description = "Return the image of a scene in the player's selected story, resized and compressed to at most 1 MiB."
    )]
    #[instrument(name = "mcp.load_scene_image", skip_all)]
    pub async fn load_scene_image(
        &self,
        request: Parameters<LoadSceneImageInput>,
        meta: Meta,
        client: Peer<RoleServer>,
    ) -> Result<Content, ToolError> {
        let progress = make_mcp_progress(&meta, &client);
        self.handle_load_scene_image(request, progress)
            .await
            .map_err(ToolError::from)
    }
}

fn text_resource(uri: &str, name: &str, description: &str) -> Resource {
    Annotated::new(
        RawResource {
            uri: uri.to_string(),
            name: name.to_string(),
            title: None,
            description: Some(description.to_string()),
            mime_type: Some("application/json".to_string()),
            size: None,
            icons: None,
            meta: None,
        },
        None,
    )
}

fn template(uri_template: &str, name: &str, description: &str) -> ResourceTemplate {
    Annotated::new(
        RawResourceTemplate {
            uri_template: uri_template.to_string(),
            name: name.to_string(),
            title: None,
            description: Some(description.to_string()),
            mime_type: Some("application/json".to_string()),
            icons: None,
        },
        None,
    )
}

#[tool_handler]
impl ServerHandler for NovelServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "novelgame".to_string(),
                title: Some("Novel Game".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"# Novel Game

Branching stories for a narrator agent. Get the `narrator_prompt` prompt first.

## Play
- list_stories: Playable stories with metadata
- select_story: Bind a story to a player, returns the current scene
- get_story_state / get_scene: Where the story stands, scene text and choices
- choose: Record the player's choice (returns "ok")
- load_scene_image: Scene image (PNG/JPEG, at most 1 MiB)

## Inspect
- get_story_meta, list_story_images, get_player_path, get_story_log

## Resources
- novelgame://stories
- novelgame://story/{story_id}/meta | images | state | scenes/{scene_id}
- novelgame://player/{player_id}/path
- novelgame://log/{story_id}
"#.to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut resources = vec![text_resource(
            &NovelResource::Stories.uri(),
            "Stories",
            "Playable stories with their metadata",
        )];
        for story in self.narrative.list_stories() {
            resources.push(text_resource(
                &NovelResource::StoryMeta(story.story_id.clone()).uri(),
                &format!("{} metadata", story.story_id),
                "Story metadata",
            ));
        }
        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            resource_templates: vec![
                template(
                    "novelgame://story/{story_id}/meta",
                    "Story Metadata",
                    "Title, author, language and other metadata of a story",
                ),
                template(
                    "novelgame://story/{story_id}/images",
                    "Story Images",
                    "Scene ids of a story that have an image",
                ),
                template(
                    "novelgame://story/{story_id}/state",
                    "Story State",
                    "Current scene, flags and summary of a story",
                ),
                template(
                    "novelgame://story/{story_id}/scenes/{scene_id}",
                    "Scene",
                    "Scene document. Example: novelgame://story/haunted_house/scenes/intro",
                ),
                template(
                    "novelgame://player/{player_id}/path",
                    "Player Path",
                    "Scenes a player has chosen in since their last story selection",
                ),
                template(
                    "novelgame://log/{story_id}",
                    "Story Log",
                    "Start and choice events of a story, oldest first",
                ),
            ],
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = &request.uri;

        if !uri.starts_with(SCHEME) {
            return Err(McpError::resource_not_found(
                format!("Invalid URI scheme, expected {}: {}", SCHEME, uri),
                None,
            ));
        }

        let resource = NovelResource::parse(uri).ok_or_else(|| {
            McpError::resource_not_found(format!("Unknown resource: {}", uri), None)
        })?;
        let text = render_resource(&self.narrative, &resource).await?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: uri.to_string(),
                mime_type: Some("application/json".to_string()),
                text,
                meta: None,
            }],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            prompts: vec![Prompt::new(
                NARRATOR_PROMPT_NAME,
                Some("System prompt for the narrator LLM that runs the game"),
                Some(vec![PromptArgument {
                    name: "language".into(),
                    title: None,
                    description: Some("Narration language (default: Japanese)".into()),
                    required: Some(false),
                }]),
            )],
            next_cursor: None,
            meta: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        match request.name.as_str() {
            NARRATOR_PROMPT_NAME => Ok(get_narrator_prompt(request.arguments)),
            _ => Err(McpError::invalid_params(
                format!("Unknown prompt: {}", request.name),
                None,
            )),
        }
    }
}

impl NovelServer {
    /// Create server from shared AppContext (used by unified binary).
    pub fn from_context(ctx: &crate::init::AppContext) -> Self {
        Self::new(
            ctx.narrative.clone(),
            ctx.config.max_width,
            ctx.config.max_height,
        )
    }
}

/// Run MCP server on stdio transport.
pub async fn run_mcp_server(ctx: crate::init::AppContext) -> anyhow::Result<()> {
    let server = NovelServer::from_context(&ctx);

    tracing::info!(
        "Starting novelgame MCP server v{} ({} stories)",
        env!("CARGO_PKG_VERSION"),
        ctx.catalog.playable_count()
    );

    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server.serve(transport).await?;
    tracing::info!("MCP server listening on stdio (10 tools)");

    tokio::select! {
        result = service.waiting() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("MCP server shutting down");
    Ok(())
}
