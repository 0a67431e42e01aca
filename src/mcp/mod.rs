pub mod error;
pub mod progress;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;
pub mod types;

pub use server::NovelServer;
pub use types::*;
