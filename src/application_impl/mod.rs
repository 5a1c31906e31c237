mod friending_service_impl;
mod identity_service_impl;
mod pair_lock;
mod presenter;
mod session_verifier_fake;

pub use friending_service_impl::*;
pub use identity_service_impl::*;
pub use pair_lock::*;
pub use presenter::*;
pub use session_verifier_fake::*;
