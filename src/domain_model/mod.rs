mod hint;
mod identity;
mod login_log;
mod token;
mod user;

pub use hint::*;
pub use identity::*;
pub use login_log::*;
pub use token::*;
pub use user::*;
