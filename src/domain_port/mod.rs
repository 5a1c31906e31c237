mod store_error;

pub use store_error::*;

// repo

mod friend_request_repo;
mod friendship_repo;
mod user_repo;

pub use friend_request_repo::*;
pub use friendship_repo::*;
pub use user_repo::*;
