// store

mod kv_store;
mod store_error;

pub use kv_store::*;
pub use store_error::*;

// repo

mod hint_repo;
mod login_log_repo;
mod user_directory;

pub use hint_repo::*;
pub use login_log_repo::*;
pub use user_directory::*;

// time

mod clock;

pub use clock::*;
