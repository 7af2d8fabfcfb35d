//! Infrastructure layer for agentic-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use openrouter::{OpenRouterSettings, OpenRouterTransport};
pub use storage::JsonFileStore;
