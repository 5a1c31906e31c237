mod friend;
mod request;
mod unit;
mod user;

pub use friend::*;
pub use request::*;
pub use unit::*;
pub use user::*;
