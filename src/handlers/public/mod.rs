// handlers/public/mod.rs - endpoints that need no token
pub mod auth;
pub mod posts;
pub mod users;

pub use auth::{login, register};
pub use posts::{comments, list as posts_list};
pub use users::{get as user_get, list as users_list};
