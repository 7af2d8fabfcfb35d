//! CLI entrypoint for agentic-chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agentic_application::{
    AgentChatService, AutoSaver, ConversationLogger, ConveneCouncilUseCase, ConversationStore,
    EventBus, HandleAgentMessageUseCase, InterpretCommandUseCase, NoConversationLogger,
    PreferenceStore, Preferences, RunCouncilUseCase, SessionManager, SessionStore, Workspace,
};
use agentic_domain::{ConfigIssue, ConversationId, ExpandState};
use agentic_infrastructure::config::expand_home;
use agentic_infrastructure::{
    ConfigLoader, FileConfig, JsonFileStore, JsonlConversationLogger, OpenRouterTransport,
};
use agentic_presentation::{
    ChatContext, ChatRepl, Cli, Command, CommandRunner, LoginArgs, OutputConfig, ReplConfig,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let data_dir = config.session.data_dir();
    let _log_guard = init_logging(cli.verbose, config.logging.file_log, &data_dir);
    info!("Starting agentic-chat");

    let issues = config.validate();
    report_issues(&issues)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let store = Arc::new(JsonFileStore::new(&data_dir));
    let (default_models, _) = config.models.parse_active();
    let (default_agent, _) = config.models.parse_agent();
    let preferences = Preferences::new(Arc::clone(&store) as Arc<dyn PreferenceStore>)
        .with_defaults(default_models, default_agent);

    if let Some(Command::Login(args)) = &cli.command {
        return login(&preferences, args).await;
    }
    if let Some(Command::Config) = &cli.command {
        print_config(&cli, &config, &issues);
        return Ok(());
    }

    let api_key = config.provider.resolve_api_key(preferences.api_key().await);
    if api_key.is_none() {
        warn!("No API key configured");
    }
    let transport = Arc::new(OpenRouterTransport::new(config.provider.settings(), api_key)?);

    let logger: Arc<dyn ConversationLogger> = if config.logging.conversation_log {
        match JsonlConversationLogger::open(data_dir.join("conversations.jsonl")) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoConversationLogger),
        }
    } else {
        Arc::new(NoConversationLogger)
    };

    let params = config.chat_params();
    let workspace = Workspace::new();
    let events = EventBus::default();

    let sessions = Arc::new(SessionManager::new(
        Arc::clone(&store) as Arc<dyn SessionStore>,
        workspace.clone(),
        events.clone(),
    ));
    let session = sessions.restore_most_recent().await;
    info!("Resumed session {} ({})", session.name, session.id);
    restore_expand_preference(&workspace, &preferences).await;

    let autosaver = AutoSaver::spawn(Arc::clone(&sessions), &events, params.autosave_delay);

    let conversations = || {
        ConversationStore::new(Arc::clone(&transport), workspace.clone(), events.clone())
            .with_logger(Arc::clone(&logger))
    };
    let agent_chats = AgentChatService::new(workspace.clone(), events.clone());
    let interpreter =
        InterpretCommandUseCase::new(Arc::clone(&transport), workspace.clone(), params.clone())
            .with_logger(Arc::clone(&logger));
    let council = ConveneCouncilUseCase::new(
        RunCouncilUseCase::new(Arc::clone(&transport)).with_logger(Arc::clone(&logger)),
        workspace.clone(),
        agent_chats.clone(),
    );

    let ctx = ChatContext {
        conversations: conversations(),
        agent: HandleAgentMessageUseCase::new(interpreter, conversations(), agent_chats.clone()),
        council,
        agent_chats,
        sessions: Arc::clone(&sessions),
        preferences,
    };

    let output = OutputConfig {
        format: cli
            .output
            .map(Into::into)
            .or(config.output.format)
            .unwrap_or_default(),
        color: config.output.color,
    };
    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: Some(match &config.repl.history_file {
            Some(path) => expand_home(path),
            None => data_dir.join("history.txt"),
        }),
        ..ReplConfig::default()
    };

    let runner = CommandRunner::new(ctx, output)
        .with_progress(repl_config.show_progress)
        .with_streaming(repl_config.stream_replies);

    // === Run ===
    let outcome = match cli.command {
        None => run_repl(runner, repl_config).await,
        Some(Command::Agent { message }) if message.is_empty() => {
            run_repl(runner, repl_config).await
        }
        Some(command) => runner.run(command).await.map_err(Into::into),
    };

    autosaver.shutdown().await;
    if let Err(e) = sessions.save().await {
        warn!("Final save failed: {}", e);
    }

    outcome
}

async fn run_repl(
    runner: CommandRunner<OpenRouterTransport>,
    config: ReplConfig,
) -> Result<()> {
    ChatRepl::new(runner, config)
        .run()
        .await
        .context("Terminal error")
}

/// Install the stderr subscriber and, when enabled, a daily log file.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(verbose: u8, file_log: bool, data_dir: &Path) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = if file_log {
        let appender = tracing_appender::rolling::daily(data_dir.join("logs"), "agentic-chat.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

/// Print every issue; fail when any of them is fatal
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        if issue.is_error() {
            eprintln!("config error: {}", issue.message);
        } else {
            warn!("config: {}", issue.message);
        }
    }
    if issues.iter().any(ConfigIssue::is_error) {
        bail!("Invalid configuration");
    }
    Ok(())
}

/// Seed the tree expand state from the saved preference when the session has none
async fn restore_expand_preference(workspace: &Workspace, preferences: &Preferences) {
    if !workspace.read(|s| s.expand.ids().is_empty()) {
        return;
    }
    let saved = preferences.expanded_ids().await;
    workspace.write(|s| {
        let known: Vec<ConversationId> = saved
            .into_iter()
            .filter(|id| s.forest.get(id).is_some())
            .collect();
        s.expand = ExpandState::from_ids(known);
    });
}

async fn login(preferences: &Preferences, args: &LoginArgs) -> Result<()> {
    if args.logout {
        preferences.clear_api_key().await?;
        println!("API key removed.");
        return Ok(());
    }

    let key = match &args.key {
        Some(key) => key.clone(),
        None => {
            eprintln!("Paste your OpenRouter API key and press Enter:");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read the API key")?;
            line
        }
    };
    if key.trim().is_empty() {
        bail!("No API key given");
    }
    preferences.set_api_key(&key).await?;
    println!("API key saved.");
    Ok(())
}

fn print_config(cli: &Cli, config: &FileConfig, issues: &[ConfigIssue]) {
    for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
        println!("{}", line);
    }
    println!();

    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some("********".to_string());
    }
    match toml::to_string_pretty(&shown) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Could not render configuration: {}", e),
    }

    for issue in issues {
        println!("{:?}: {}", issue.severity, issue.message);
    }
}
