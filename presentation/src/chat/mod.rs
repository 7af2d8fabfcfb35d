//! Interactive chat module
//!
//! Runs commands against the application services, either one at a time
//! from the command line or from the reedline-based agent REPL.

mod context;
mod repl;
mod runner;

pub use context::{ChatContext, label_of, resolve_conversation};
pub use repl::ChatRepl;
pub use runner::{CommandError, CommandRunner};
