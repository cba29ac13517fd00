mod auth_service_impl;
mod credential_hasher_argon2;
mod hint_fixture;
mod hint_service_impl;
mod identity_resolver_impl;
mod rate_limiter_fixed_window;
mod token_codec_jwt;
mod token_service_impl;
mod user_service_impl;

pub use auth_service_impl::*;
pub use credential_hasher_argon2::*;
pub use hint_fixture::*;
pub use hint_service_impl::*;
pub use identity_resolver_impl::*;
pub use rate_limiter_fixed_window::*;
pub use token_codec_jwt::*;
pub use token_service_impl::*;
pub use user_service_impl::*;
