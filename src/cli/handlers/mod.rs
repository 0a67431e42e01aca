//! CLI command handlers.

pub mod check;
pub mod image;
pub mod story;
