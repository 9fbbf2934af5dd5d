//! Subcommands that run without the viewer.

mod ai;

pub use ai::run_ai_command;
