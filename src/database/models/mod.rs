pub mod post;
pub mod user;

pub use post::{Post, PostColumn, PostListing, Posts};
pub use user::{User, UserColumn, UserSummary, Users};
