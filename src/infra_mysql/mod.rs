mod friend_request_repo_mysql;
mod friendship_repo_mysql;
mod user_repo_mysql;

pub use friend_request_repo_mysql::*;
pub use friendship_repo_mysql::*;
pub use user_repo_mysql::*;

mod util;
