pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod image;
pub mod init;
pub mod mcp;
pub mod models;
pub mod services;
pub mod session;

pub use error::{LoadError, NovelError};
