//! Command-line front end for stackpage.
//!
//! # Key Abstractions
//!
//! - [`StackpageCli`]: loads the stack config and dispatches commands
//! - [`CliArgs`]: clap argument tree shared with the binary

pub mod app;
pub mod cli;
pub mod config_handlers;

pub use app::StackpageCli;
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
