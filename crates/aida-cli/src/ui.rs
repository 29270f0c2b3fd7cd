//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use aida_core::Result;

const PROMPT: &str = "aida>";

/// What the startup banner reports
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub version: String,
    pub provider: String,
    pub model: String,
    pub profile: String,
}

/// Framed startup banner lines, without colour
fn banner_lines(info: &BannerInfo, width: usize) -> Vec<String> {
    let inner = width.saturating_sub(2);
    let pad = |text: &str| {
        let used = text.chars().count() + 2;
        format!("│  {}{}│", text, " ".repeat(inner.saturating_sub(used)))
    };

    let provider = format!("LLM Provider: {}", info.provider);
    let model = format!("Model: {}", info.model);
    let version = format!("v{} • profile {}", info.version, info.profile);
    let mut lines = vec![
        format!("┌{}┐", "─".repeat(inner)),
        pad("AiDA - AI Document Assistant"),
        pad(""),
        pad("Chat with your PDF, DOCX, PPTX, TXT and Markdown files"),
        pad("or ask about anything on the web."),
        pad(""),
        pad(&provider),
        pad(&model),
        pad(""),
        pad(&version),
    ];
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines
}

/// Display startup banner
pub fn display_banner(info: &BannerInfo) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    println!();
    for line in banner_lines(info, banner_width) {
        println!("{}", line.blue());
    }
    println!();
    println!(
        "{}",
        "💡 Tip: type 'exit' to end the conversation, '/save' to save, '/load <name>' to load, 'help' for more".dimmed()
    );
    println!();
}

fn redraw(input: &str, cursor_pos: usize) -> io::Result<()> {
    let tail = input.chars().count() - cursor_pos;
    print!("\r\x1b[2K{} {}", PROMPT.green().bold(), input);
    if tail > 0 {
        print!("\x1b[{}D", tail);
    }
    io::stdout().flush()
}

fn byte_index(input: &str, char_pos: usize) -> usize {
    input
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}

/// Handle input with history navigation
///
/// Falls back to a plain line read when stdin is not a terminal.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(input)
}

/// Ctrl+C always ends the session, Ctrl+D only on an empty line
fn is_exit_key(key: &KeyEvent, input: &str) -> bool {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => true,
        KeyCode::Char('d') => input.is_empty(),
        _ => false,
    }
}

fn read_line_raw(history: &[String]) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    redraw(&input, cursor_pos)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind == KeyEventKind::Release {
            continue;
        }
        if is_exit_key(&key_event, &input) {
            return Ok("exit".to_string());
        }
        match key_event.code {
            KeyCode::Enter => return Ok(input.trim().to_string()),
            KeyCode::Esc => return Ok(String::new()),
            KeyCode::Char(_) if key_event.modifiers.contains(KeyModifiers::CONTROL) => continue,
            KeyCode::Char(c) => {
                input.insert(byte_index(&input, cursor_pos), c);
                cursor_pos += 1;
            }
            KeyCode::Backspace if cursor_pos > 0 => {
                cursor_pos -= 1;
                input.remove(byte_index(&input, cursor_pos));
            }
            KeyCode::Left if cursor_pos > 0 => cursor_pos -= 1,
            KeyCode::Right if cursor_pos < input.chars().count() => cursor_pos += 1,
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
                cursor_pos = input.chars().count();
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    cursor_pos = input.chars().count();
                }
            }
            _ => continue,
        }
        redraw(&input, cursor_pos)?;
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask about a document or anything else", "<question>".green());
    println!("  {} - Save this chat to the chats folder", "/save [name]".green());
    println!("  {} - Replace this chat with a saved one", "/load <name>".green());
    println!("  {} - Forget the current conversation", "/clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Clear the session and exit", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  summarize ./papers/attention.pdf");
    println!("  \"My Notes/week 1.md\" what are the action items?");
    println!("  what is the latest stable Rust release?");
}
