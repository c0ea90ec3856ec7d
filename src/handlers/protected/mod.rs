// handlers/protected/mod.rs - endpoints behind require_auth
//
// Handlers read the caller from the AuthUser extractor; writes are always
// scoped to that identity.
pub mod auth;
pub mod posts;
pub mod user;

pub use auth::whoami;
pub use posts::{create as post_create, delete as post_delete, update as post_update};
pub use user::{delete as user_delete, update as user_update};
