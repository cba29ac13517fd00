//! In-process adapters. Selected by the `memory` backends in settings and used
//! as test doubles.

mod hint_repo_memory;
mod kv_store_memory;
mod login_log_repo_memory;
mod manual_clock;
mod user_directory_memory;

pub use hint_repo_memory::*;
pub use kv_store_memory::*;
pub use login_log_repo_memory::*;
pub use manual_clock::*;
pub use user_directory_memory::*;
