mod friending_service;
mod identity_service;
mod session_service;

pub use friending_service::*;
pub use identity_service::*;
pub use session_service::*;
