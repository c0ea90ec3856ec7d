pub mod claims;
pub mod password;
pub mod token;

pub use claims::Claims;
pub use token::{TokenError, TokenSecret, TokenService, MIN_SECRET_LEN};
