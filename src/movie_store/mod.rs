//! SQLite persistence for normalized and classified movie records.

mod models;
mod schema;
mod store;

pub use models::{ClassifiedMovie, MovieRange};
pub use schema::is_valid_table_name;
pub use store::SqliteMovieStore;
