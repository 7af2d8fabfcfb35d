//! Presentation layer for agentic-chat
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive agent REPL.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatContext, ChatRepl, CommandError, CommandRunner};
pub use cli::commands::{
    ChatsCommand, Cli, Command, LoginArgs, ModelsCommand, OutputFormat, SessionsCommand,
    SlashCommand,
};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
