//! Parsing of chat input into session commands

use chrono::{DateTime, Local};

use aida_core::{Error, Result};

/// What a line typed at the prompt asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `exit` or `quit`
    Exit,
    Help,
    /// `/clear`: forget the live session
    Clear,
    /// `/save [name]`
    Save(Option<String>),
    /// `/load <name>`
    Load(String),
    /// Anything else goes to the agent
    Prompt(String),
    Empty,
}

impl ChatCommand {
    pub fn parse(input: &str) -> Result<ChatCommand> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(ChatCommand::Empty);
        }

        let (head, rest) = match input.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };

        let command = match head.to_lowercase().as_str() {
            "exit" | "quit" if rest.is_empty() => ChatCommand::Exit,
            "help" | "/help" if rest.is_empty() => ChatCommand::Help,
            "/clear" => ChatCommand::Clear,
            "/save" if rest.is_empty() => ChatCommand::Save(None),
            "/save" => ChatCommand::Save(Some(rest.to_string())),
            "/load" if rest.is_empty() => {
                return Err(Error::InvalidInput("usage: /load <name>".to_string()));
            }
            "/load" => ChatCommand::Load(rest.to_string()),
            _ => ChatCommand::Prompt(input.to_string()),
        };
        Ok(command)
    }
}

/// Export name used by `/save` without an argument
pub fn default_chat_name(now: DateTime<Local>) -> String {
    now.format("chat_%Y%m%d_%H%M%S").to_string()
}
