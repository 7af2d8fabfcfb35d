//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for transcripts and council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Whole transcripts, every ranking and the synthesis
    Full,
    /// Only the latest reply, or only the chairman's answer
    Synthesis,
    /// JSON output
    Json,
}

impl From<OutputFormat> for agentic_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => agentic_domain::OutputFormat::Full,
            OutputFormat::Synthesis => agentic_domain::OutputFormat::Synthesis,
            OutputFormat::Json => agentic_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agentic-chat
#[derive(Parser, Debug)]
#[command(name = "agentic-chat")]
#[command(author, version, about = "Fan a prompt out to several LLMs, branch the answers, and let them rank each other")]
#[command(long_about = r#"
agentic-chat keeps a forest of model conversations.

Ask once and every active model answers in its own conversation. Branch any
conversation to explore follow-ups without touching the original. Convene a
council to have the models rank each other's answers and a chairman write
the final one.

Without a subcommand the interactive agent starts: describe what you want
in plain words and the orchestrator model creates or branches conversations.

Configuration files are loaded from (in priority order):
1. AGENTIC_CHAT_* environment variables
2. --config <path>         Explicit config file
3. ./agentic-chat.toml     Project-level config
4. ~/.config/agentic-chat/config.toml   Global config

Example:
  agentic-chat ask "Explain the borrow checker"
  agentic-chat branch 1 -n 2 -p "Shorter" -p "With an example"
  agentic-chat council
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Everything the tool can do, from the command line or as a REPL slash command
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start one new conversation per active model, all with the same prompt
    Ask {
        /// The prompt
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Number of conversations (models are assigned round-robin)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Use these models instead of the active list (repeatable)
        #[arg(short, long = "model", value_name = "MODEL")]
        models: Vec<String>,
    },

    /// Branch a conversation into new ones that share its history
    Branch {
        /// Conversation id, tree label, model name or position
        conversation: String,

        /// Number of branches
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Prompt for each branch (repeatable; the first one fills the gaps)
        #[arg(short, long = "prompt", value_name = "TEXT", required = true)]
        prompts: Vec<String>,
    },

    /// Send a message to the current conversation
    Send {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Switch to this conversation first
        #[arg(short, long, value_name = "CONVERSATION")]
        conversation: Option<String>,
    },

    /// Move to the next conversation
    Next,

    /// Move to the previous conversation
    Prev,

    /// Print a conversation transcript (default: the current one)
    Show {
        conversation: Option<String>,
    },

    /// Print the conversation tree
    Tree {
        /// Ignore collapse state and show every branch
        #[arg(short, long)]
        all: bool,
    },

    /// Expand or collapse a conversation in the tree
    Expand {
        /// Conversation to toggle
        conversation: Option<String>,

        /// Collapse everything instead
        #[arg(long, conflicts_with = "conversation")]
        reset: bool,
    },

    /// Rank the latest answers of root conversations and synthesize one
    Council {
        /// Conversations to include (default: every answered root)
        conversations: Vec<String>,

        /// Model that writes the final answer
        #[arg(long, value_name = "MODEL")]
        chairman: Option<String>,
    },

    /// Talk to the orchestrator (one turn, or the REPL without a message)
    Agent {
        message: Vec<String>,
    },

    /// Manage orchestrator chats inside the current session
    #[command(subcommand)]
    Chats(ChatsCommand),

    /// Manage saved sessions
    #[command(subcommand)]
    Sessions(SessionsCommand),

    /// Manage the active models and the orchestrator model
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Store (or remove) the OpenRouter API key
    Login(LoginArgs),

    /// Show configuration sources and the effective settings
    Config,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SessionsCommand {
    /// List sessions, most recently used first
    List,
    /// Start a fresh session
    New,
    /// Switch to a session
    Load { id: String },
    /// Delete a session
    Delete { id: String },
    /// Rename a session
    Rename { id: String, name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ModelsCommand {
    /// List active models
    List,
    /// Add an active model
    Add {
        /// OpenRouter model id, e.g. `openai/gpt-4o`
        id: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove an active model
    Remove { id: String },
    /// Show or set the orchestrator model
    Agent { id: Option<String> },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ChatsCommand {
    /// List orchestrator chats
    List,
    /// Start a new chat and switch to it
    New { name: Option<String> },
    /// Switch chat
    Switch { id: String },
    /// Rename a chat
    Rename { id: String, name: String },
    /// Delete a chat
    Delete { id: String },
    /// Print the current chat
    Show,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct LoginArgs {
    /// The key; read from stdin when omitted
    pub key: Option<String>,

    /// Forget the stored key
    #[arg(long, conflicts_with = "key")]
    pub logout: bool,
}

/// A REPL line after the leading slash
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
pub struct SlashCommand {
    #[command(subcommand)]
    pub command: Command,
}

impl SlashCommand {
    /// Parse `/tree --all` style input
    pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
        let line = line.strip_prefix('/').unwrap_or(line);
        Self::try_parse_from(split_args(line)).map(|s| s.command)
    }
}

/// Split on whitespace, keeping double-quoted runs together
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }
    args
}
