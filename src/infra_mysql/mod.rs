mod hint_repo_mysql;
mod login_log_repo_mysql;
mod user_directory_mysql;

pub use hint_repo_mysql::*;
pub use login_log_repo_mysql::*;
pub use user_directory_mysql::*;

mod util;
