//! Process-wide `tracing` setup. Call [`Logger::new_bootstrap`] once, then
//! [`Logger::reload_from_config`] after settings are parsed.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
