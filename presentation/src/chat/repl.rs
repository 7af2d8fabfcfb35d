//! REPL (Read-Eval-Print Loop) for the orchestrator agent
//!
//! Plain lines go to the agent; lines starting with `/` run the same
//! commands as the command line.

use super::runner::CommandRunner;
use crate::cli::commands::{Command, SlashCommand};
use crate::config::ReplConfig;
use agentic_application::ModelTransport;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// What to do after a slash command
#[derive(Debug, PartialEq)]
enum CommandResult {
    Continue,
    Exit,
}

/// Interactive agent REPL
pub struct ChatRepl<T: ModelTransport + 'static> {
    runner: CommandRunner<T>,
    config: ReplConfig,
}

impl<T: ModelTransport + 'static> ChatRepl<T> {
    pub fn new(runner: CommandRunner<T>, config: ReplConfig) -> Self {
        Self { runner, config }
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.config.history_file else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Line history disabled: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("agent".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome().await;

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match self.handle_command(line).await {
                            CommandResult::Exit => break,
                            CommandResult::Continue => continue,
                        }
                    }

                    if let Err(e) = self.runner.agent(line).await {
                        eprintln!("{} {}", "Error:".red().bold(), e);
                    }
                    println!();
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn print_welcome(&self) {
        let ctx = self.runner.context();
        let models = ctx.preferences.active_models().await;
        let agent_model = ctx.preferences.agent_model().await;
        let chat = ctx.agent_chats.current();

        println!();
        println!("{}", "╭─────────────────────────────────────────────╮".cyan());
        println!("{}", "│           agentic-chat - Agent Mode         │".cyan());
        println!("{}", "╰─────────────────────────────────────────────╯".cyan());
        println!();
        println!("{} {}", "Agent Model:".bold(), agent_model);
        println!(
            "{} {}",
            "Active Models:".bold(),
            if models.is_empty() {
                "none (add one with /models add <id>)".to_string()
            } else {
                models
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        );
        println!(
            "{} {} ({} messages)",
            "Chat:".bold(),
            chat.name,
            chat.history.len()
        );
        println!();
        println!("{}", "Describe what you want, for example:".dimmed());
        println!("{}", "  \"Ask 3 models for a haiku about autumn\"".dimmed());
        println!("{}", "  \"Branch conversation 2 twice: shorter, funnier\"".dimmed());
        println!();
        println!("Type {} for commands.", "/help".cyan());
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Commands:".bold());
        println!("  /help, /h, /?                 - Show this help");
        println!("  /tree [--all]                 - Show the conversation tree");
        println!("  /show [conversation]          - Print a transcript");
        println!("  /next, /prev                  - Move between conversations");
        println!("  /expand [conversation]        - Expand or collapse a branch");
        println!("  /send <message>               - Message the current conversation");
        println!("  /ask <prompt> [-n N]          - Start conversations directly");
        println!("  /branch <conv> -n N -p <text> - Branch a conversation directly");
        println!("  /council [conversations...]   - Rank answers and synthesize one");
        println!("  /chats list|new|switch|show   - Manage agent chats");
        println!("  /sessions list|new|load|...   - Manage sessions");
        println!("  /models list|add|remove|agent - Manage models");
        println!("  /clear                        - Clear the current agent chat");
        println!("  /quit, /exit, /q              - Exit");
        println!();
        println!("{}", "Conversations:".bold());
        println!("  Refer to a conversation by tree label (1.2), id, model name or position.");
        println!();
    }

    /// Handle slash commands. Returns whether to continue or exit.
    async fn handle_command(&self, line: &str) -> CommandResult {
        match line.split_whitespace().next().unwrap_or("") {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return CommandResult::Exit;
            }
            "/help" | "/h" | "/?" => {
                self.print_help();
                return CommandResult::Continue;
            }
            "/clear" => {
                self.runner.context().agent_chats.clear_current();
                println!("{}", "Agent chat cleared.".green());
                return CommandResult::Continue;
            }
            _ => {}
        }

        match SlashCommand::parse_line(line) {
            Ok(Command::Agent { message }) if message.is_empty() => {
                println!("Already talking to the agent. Just type your request.");
            }
            Ok(command) => {
                if let Err(e) = self.runner.run(command).await {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
            }
            Err(e) => {
                // clap renders usage and suggestions itself
                let _ = e.print();
                println!("Type /help for available commands");
            }
        }
        CommandResult::Continue
    }
}
