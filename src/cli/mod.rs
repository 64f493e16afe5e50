pub mod commands;
pub mod status_commands;

pub use commands::{Cli, Commands};
pub use status_commands::StatusCommandHandler;
