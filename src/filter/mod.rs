pub mod types;
pub mod listing;

pub use types::*;
pub use listing::{build_listing, build_user_listing};
