//! Tool handler implementations; the `#[tool]` entry points live in server.rs.

pub mod catalog;
pub mod image;
pub mod play;
