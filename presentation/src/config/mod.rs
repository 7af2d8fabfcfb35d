//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior. The binary fills
//! these from the loaded config file and the command line.

use agentic_domain::OutputFormat;
use std::path::PathBuf;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Full,
            color: true,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    /// Show progress indicators during council runs
    pub show_progress: bool,
    /// Line history file; `None` keeps history in memory only
    pub history_file: Option<PathBuf>,
    /// Stream the first branch of a branch action as it arrives
    pub stream_replies: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("agentic-chat").join("history.txt")),
            stream_replies: true,
        }
    }
}
