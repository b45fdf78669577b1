//! Core types - pure abstractions shared across the codebase.

mod chunk;
mod state;

pub use chunk::Chunk;
pub use state::{is_shutdown, setup_shutdown_handler};
