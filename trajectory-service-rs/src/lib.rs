//! Trajectory Service Library
//! Parses heterogeneous agent-trajectory logs into one normalized model and
//! serves it over a paginated, filterable query API.

pub mod adapters;
pub mod api;
pub mod detect;
pub mod error;
pub mod loader;
pub mod model;
pub mod query;

pub use adapters::{adapter_for, HuggingFaceAdapter, RebelJsonAdapter, TrajectoryAdapter};
pub use detect::{detect_format, FormatTag};
pub use error::{LoadError, LoadResult};
pub use loader::TrajectoryLoader;
pub use model::{Message, Role, TaskType, Trajectory, TrajectoryStatus};
pub use query::{TrajectoryFilter, TrajectoryStore};

#[cfg(test)]
mod tests;
