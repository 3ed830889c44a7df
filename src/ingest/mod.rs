//! CSV loading and field normalization.

mod loader;
mod models;

pub use loader::{load_movies, REQUIRED_HEADERS};
pub use models::{LoadSummary, MalformedPolicy, NormalizedMovie};
