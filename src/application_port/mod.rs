mod auth_service;
mod hint_service;
mod rate_limiter;
mod user_service;

pub use auth_service::*;
pub use hint_service::*;
pub use rate_limiter::*;
pub use user_service::*;
