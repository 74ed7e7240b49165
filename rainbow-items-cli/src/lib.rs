//! Command-line front end for `rainbow-items`
//!
//! Loads every item document below a directory and runs one query against
//! them, printing the answer as JSON.

pub mod cli;
pub mod commands;
pub mod config;
pub mod loader;

pub use cli::{Cli, Commands};
pub use commands::{run, Outcome};
pub use config::CliConfig;
pub use loader::load_documents;
