pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use manager::DatabaseError;
pub use query_builder::{ConditionSet, FieldSet, QueryError};
pub use repository::{PostRepository, UserRepository};
