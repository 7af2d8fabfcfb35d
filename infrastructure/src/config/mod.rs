//! Configuration file loading for agentic-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `AGENTIC_CHAT_` (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./agentic-chat.toml` or `./.agentic-chat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/agentic-chat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_BASE_URL, FileConfig, FileLoggingConfig, FileModelEntry, FileModelsConfig,
    FileOutputConfig, FileProviderConfig, FileReplConfig, FileSessionConfig, expand_home,
};
pub use loader::ConfigLoader;
