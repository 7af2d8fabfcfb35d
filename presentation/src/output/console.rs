//! Console output formatter for transcripts, the tree and council results

use agentic_application::SessionSummary;
use agentic_domain::core::string::truncate;
use agentic_domain::{
    AgentChat, AgentChatSummary, ConversationId, ConversationNode, ConversationTree,
    CouncilResult, ExpandState, Message, MessageSource, ModelBinding, Role,
};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Longest first prompt shown in a tree row
pub const TREE_PROMPT_WIDTH: usize = 30;

/// Formats application state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    // ==================== Conversations ====================

    /// Full transcript of one conversation
    pub fn transcript(node: &ConversationNode, label: Option<&str>) -> String {
        let mut output = String::new();

        let title = match label {
            Some(label) => format!("{}. {}", label, node.model_name),
            None => node.model_name.clone(),
        };
        output.push_str(&Self::header(&title));
        output.push_str(&format!("{} {}\n", "Model:".dimmed(), node.model_id.dimmed()));
        if let Some(parent) = &node.parent_id {
            output.push_str(&format!(
                "{} {} (at message {})\n",
                "Branched from:".dimmed(),
                parent,
                node.branch_point.unwrap_or(0)
            ));
        }

        for message in &node.history {
            output.push_str(&Self::message(message, &node.model_name));
        }
        if node.is_pending() {
            output.push_str(&format!("\n{}\n", "(waiting for reply)".dimmed()));
        }
        output
    }

    /// Latest reply only
    pub fn latest_reply(node: &ConversationNode) -> String {
        match node.last_reply() {
            Some(reply) => format!(
                "{}\n{}\n",
                format!("── {} ──", node.model_name).yellow().bold(),
                reply.content
            ),
            None => format!("{}\n", "(no reply yet)".dimmed()),
        }
    }

    fn message(message: &Message, model_name: &str) -> String {
        let speaker: ColoredString = match message.role {
            Role::User => match message.source {
                Some(MessageSource::Agent) => "Agent".magenta().bold(),
                _ => "You".green().bold(),
            },
            Role::Assistant if message.is_error() => model_name.red().bold(),
            Role::Assistant => model_name.yellow().bold(),
            Role::System => "System".dimmed(),
        };
        format!("\n{}\n{}\n", speaker, message.content)
    }

    /// One line per created or branched node
    pub fn node_summaries(nodes: &[ConversationNode]) -> String {
        let mut output = String::new();
        for node in nodes {
            let status = match node.last_reply() {
                Some(reply) if reply.is_error() => "failed".red(),
                Some(_) => "answered".green(),
                None => "pending".dimmed(),
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                Self::badge(&node.model()),
                node.id.as_str().dimmed(),
                status
            ));
        }
        output
    }

    // ==================== Tree ====================

    /// Indented tree with dotted labels.
    ///
    /// Each row shows the expand arrow, a model badge, the first prompt cut to
    /// [`TREE_PROMPT_WIDTH`] characters and the number of direct branches. The
    /// current conversation is marked with `*`.
    pub fn tree(
        nodes: &[ConversationNode],
        expand: &ExpandState,
        current: Option<&ConversationId>,
    ) -> String {
        let tree = ConversationTree::build(nodes, expand);
        if tree.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }

        let mut output = String::new();
        for row in tree.visible_nodes() {
            let marker = if current == Some(row.id()) {
                "*".cyan().bold()
            } else {
                " ".normal()
            };
            let arrow = match (row.has_children(), row.is_expanded) {
                (true, true) => "▼",
                (true, false) => "▶",
                (false, _) => " ",
            };
            let prompt = row
                .node
                .first_prompt()
                .map(|p| truncate(p, TREE_PROMPT_WIDTH))
                .unwrap_or_else(|| "New conversation".to_string());
            let branches = match row.children.len() {
                0 => String::new(),
                1 => " (1 branch)".to_string(),
                n => format!(" ({} branches)", n),
            };
            let state = match row.node.last_reply() {
                _ if row.node.is_pending() => " …".dimmed(),
                Some(reply) if reply.is_error() => " !".red().bold(),
                _ => "".normal(),
            };

            output.push_str(&format!(
                "{} {}{} {} {}. {}{}{}\n",
                marker,
                "  ".repeat(row.depth),
                arrow,
                Self::badge(&row.node.model()),
                row.label.bold(),
                prompt,
                branches.dimmed(),
                state
            ));
        }
        output
    }

    /// Short model name colored by provider
    pub fn badge(model: &ModelBinding) -> ColoredString {
        let text = format!("[{}]", model.short_name());
        match model.provider() {
            Some("openai") => text.green(),
            Some("anthropic") => text.yellow(),
            Some("google") => text.blue(),
            Some("xai") => text.white(),
            Some("meta") => text.magenta(),
            _ => text.normal(),
        }
    }

    // ==================== Council ====================

    /// Peer rankings, aggregate table and chairman synthesis
    pub fn council(result: &CouncilResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Council Results"));

        output.push_str(&Self::section_header("Peer Rankings (best → worst)"));
        for entry in &result.rankings {
            let ranking = if entry.parsed_ranking.is_empty() {
                "Unable to parse".dimmed().to_string()
            } else {
                entry
                    .parsed_ranking
                    .iter()
                    .enumerate()
                    .map(|(i, label)| {
                        let name = result
                            .label_to_model
                            .get(label)
                            .map(|m| m.model_name.as_str())
                            .unwrap_or(label.as_str());
                        format!("{}. {}", i + 1, name)
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            output.push_str(&format!("  {:<24} {}\n", entry.model_name.bold(), ranking));
        }

        output.push_str(&Self::section_header("Aggregate Scores"));
        for (i, entry) in result.aggregate_rankings.iter().enumerate() {
            let place = medal(i);
            let line = format!(
                "  {:<4} {:<24} {:>5.2}  ({} votes)",
                place, entry.model_name, entry.avg_rank, entry.rankings_count
            );
            if i == 0 {
                output.push_str(&format!("{}\n", line.green().bold()));
            } else {
                output.push_str(&format!("{}\n", line));
            }
        }

        output.push_str(&Self::section_header("Final Answer"));
        output.push_str(&format!(
            "{}\n\n{}\n",
            format!("Chairman: {}", result.synthesis.model_name).yellow().bold(),
            result.synthesis.content
        ));
        output.push_str(&Self::footer());
        output
    }

    /// The chairman's answer only
    pub fn council_synthesis_only(result: &CouncilResult) -> String {
        let mut output = format!("{}\n\n", "=== Council Conclusion ===".cyan().bold());
        if let Some(winner) = result.winner() {
            output.push_str(&format!(
                "{} {} (avg rank {:.2})\n\n",
                "Top ranked:".dimmed(),
                winner.model_name,
                winner.avg_rank
            ));
        }
        output.push_str(&result.synthesis.content);
        output.push('\n');
        output
    }

    // ==================== Agent chats ====================

    /// Transcript of an orchestrator chat; council runs render as reports
    pub fn agent_chat(chat: &AgentChat) -> String {
        let mut output = Self::header(&chat.name);
        if chat.history.is_empty() {
            output.push_str(&format!("{}\n", "(empty)".dimmed()));
        }
        for message in &chat.history {
            match (&message.council, message.role) {
                (Some(result), _) => output.push_str(&Self::council(result)),
                (None, Role::User) => {
                    output.push_str(&format!("\n{}\n{}\n", "You".green().bold(), message.content))
                }
                (None, _) => output.push_str(&Self::agent_reply(message)),
            }
        }
        output
    }

    /// One orchestrator reply
    pub fn agent_reply(message: &Message) -> String {
        let speaker = if message.is_error() {
            "Agent".red().bold()
        } else {
            "Agent".magenta().bold()
        };
        format!("\n{}\n{}\n", speaker, message.content)
    }

    pub fn agent_chats(chats: &[AgentChatSummary]) -> String {
        let mut output = String::new();
        for chat in chats {
            let marker = if chat.is_current { "*".cyan().bold() } else { " ".normal() };
            output.push_str(&format!(
                "{} {:<12} {:<24} {} messages\n",
                marker,
                chat.id.dimmed(),
                chat.name,
                chat.message_count
            ));
        }
        output
    }

    // ==================== Sessions and models ====================

    pub fn sessions(sessions: &[SessionSummary]) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No saved sessions.".dimmed());
        }
        let mut output = String::new();
        for session in sessions {
            let marker = if session.is_current { "*".cyan().bold() } else { " ".normal() };
            output.push_str(&format!(
                "{} {:<24} {}  {} conversations, {} messages, {}\n",
                marker,
                session.name.bold(),
                session.id.dimmed(),
                session.conversation_count,
                session.message_count,
                format_timestamp(session.last_modified)
            ));
        }
        output
    }

    pub fn models(active: &[ModelBinding], agent_model: &str) -> String {
        let mut output = format!("{}\n", "Active models:".cyan().bold());
        if active.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for model in active {
            output.push_str(&format!(
                "  {} {} {}\n",
                Self::badge(model),
                model.name,
                model.id.dimmed()
            ));
        }
        output.push_str(&format!("{} {}\n", "Agent model:".cyan().bold(), agent_model));
        output
    }

    // ==================== Helpers ====================

    /// Pretty JSON, or `{}` if the value cannot be serialized
    pub fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

fn medal(place: usize) -> String {
    match place {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => format!("#{}", n + 1),
    }
}

fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
