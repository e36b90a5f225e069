//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;
mod describe;
mod utils;
mod validate;
mod variants;

pub use completions::handle_completions;
pub use config::handle_config;
pub use describe::handle_describe;
pub use validate::handle_validate;
pub use variants::handle_variants;
