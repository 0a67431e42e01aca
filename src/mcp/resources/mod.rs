//! MCP resources: read-only JSON views of the catalog, sessions and logs.
//!
//! Resources are for reading context, tools are for actions.

mod render;
mod uri;

pub use render::render_resource;
pub use uri::{NovelResource, SCHEME};
