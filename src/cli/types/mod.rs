//! Type-safe wrappers and enums for CLI values.

pub mod format;
pub mod ids;

pub use format::OutputFormat;
pub use ids::{CategoryId, GameId};
