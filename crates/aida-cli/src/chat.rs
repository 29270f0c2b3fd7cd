//! A live chat session: agent turns persisted to the session store

use chrono::Local;
use colored::*;
use std::path::PathBuf;

use aida_agent::{detect_document_query, Agent, AgentObserver, AgentProfile, TurnOutcome};
use aida_core::{Message, Result};
use aida_history::SessionStore;

use crate::command::{default_chat_name, ChatCommand};
use crate::observer::CliObserver;
use crate::render::render_markdown;
use crate::ui::{display_banner, handle_input_with_history, print_help, BannerInfo};

pub struct ChatSession {
    agent: Agent,
    store: SessionStore,
    session_id: String,
    chats_dir: PathBuf,
}

impl ChatSession {
    pub fn new(
        agent: Agent,
        store: SessionStore,
        session_id: impl Into<String>,
        chats_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            agent,
            store,
            session_id: session_id.into(),
            chats_dir: chats_dir.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The text actually sent to the agent for `input`
    ///
    /// The v0.1.1 profile rewrites questions naming a document into an
    /// explicit DocumentRetriever instruction.
    pub fn prepare_input(&self, input: &str) -> String {
        if self.agent.config().profile != AgentProfile::V011 {
            return input.to_string();
        }
        match detect_document_query(input) {
            Some(query) => {
                tracing::debug!(filepath = %query.filepath, "detected document query");
                query.to_prompt()
            }
            None => input.to_string(),
        }
    }

    /// Run one turn and append its messages to the session
    pub async fn send(&self, input: &str, observer: &dyn AgentObserver) -> Result<TurnOutcome> {
        let prompt = self.prepare_input(input);
        let history = self.store.messages(&self.session_id).await?;
        let outcome = self.agent.run_turn(&history, &prompt, observer).await?;

        for message in &outcome.new_messages {
            self.store.add_message(&self.session_id, message).await?;
        }
        Ok(outcome)
    }

    /// Export the session, named by timestamp unless `name` is given
    pub async fn save(&self, name: Option<&str>) -> Result<PathBuf> {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| default_chat_name(Local::now()));
        self.store.export(&self.session_id, &self.chats_dir, &name).await
    }

    /// Replace the session with a saved chat
    pub async fn load(&self, name: &str) -> Result<usize> {
        self.store.import(&self.session_id, &self.chats_dir, name).await
    }

    /// Messages of the live session, oldest first
    pub async fn messages(&self) -> Result<Vec<Message>> {
        self.store.messages(&self.session_id).await
    }

    pub async fn clear(&self) -> Result<u64> {
        self.store.clear(&self.session_id).await
    }

    /// Handle one line typed at the prompt; false once the user exits
    pub async fn handle_line(&self, line: &str, observer: &dyn AgentObserver) -> Result<bool> {
        match ChatCommand::parse(line)? {
            ChatCommand::Empty => {}
            ChatCommand::Exit => {
                self.clear().await?;
                println!("{}", "👋 Goodbye!".green());
                return Ok(false);
            }
            ChatCommand::Help => print_help(),
            ChatCommand::Clear => {
                let removed = self.clear().await?;
                println!("{} Cleared {} messages", "🧹".cyan(), removed);
            }
            ChatCommand::Save(name) => {
                let path = self.save(name.as_deref()).await?;
                println!("{} Chat saved to {}", "💾".green(), path.display());
            }
            ChatCommand::Load(name) => {
                let count = self.load(&name).await?;
                println!("{} Loaded {} messages from '{}'", "📂".green(), count, name);
            }
            ChatCommand::Prompt(input) => {
                let outcome = self.send(&input, observer).await?;
                if outcome.hit_iteration_limit {
                    eprintln!(
                        "{} Stopped after {} LLM calls",
                        "⚠️ ".yellow(),
                        outcome.iterations
                    );
                }
                println!("{}", "AiDA:".green().bold());
                println!("{}", render_markdown(&outcome.answer));
                println!();
            }
        }
        Ok(true)
    }
}

/// Interactive loop until the user exits
///
/// Errors from a single line are shown and the loop goes on.
pub async fn run_interactive(session: &ChatSession, banner: &BannerInfo) -> Result<()> {
    display_banner(banner);
    let observer = CliObserver::default();
    let mut input_history = Vec::new();

    loop {
        let line = handle_input_with_history(&mut input_history).await?;
        match session.handle_line(&line, &observer).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                tracing::debug!(error = %e, "turn failed");
                eprintln!("{} {}", "❌ Error:".red(), e);
            }
        }
    }
    Ok(())
}
