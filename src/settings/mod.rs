//! Settings are read once at startup from a TOML file; see
//! `settings/dev.toml` for a complete example.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
