//! MCP prompts.

pub mod narrator;

pub use narrator::*;
