//! Markdown to styled terminal text

use colored::*;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Default)]
struct Style {
    heading: Option<HeadingLevel>,
    strong: bool,
    emphasis: bool,
    code_block: bool,
}

impl Style {
    fn apply(&self, text: &str) -> String {
        let mut styled = text.normal();
        if let Some(level) = self.heading {
            styled = styled.bold();
            if level == HeadingLevel::H1 {
                styled = styled.underline();
            }
            styled = styled.cyan();
        }
        if self.strong {
            styled = styled.bold();
        }
        if self.emphasis {
            styled = styled.italic();
        }
        styled.to_string()
    }
}

/// Render an answer's markdown for the terminal
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    let mut style = Style::default();
    // One entry per open list: the next number for ordered lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut link: Option<String> = None;

    for event in Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => style.heading = Some(level),
            Event::End(TagEnd::Heading(_)) => {
                style.heading = None;
                out.push_str("\n\n");
            }
            Event::End(TagEnd::Paragraph) => {
                out.push('\n');
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Strong) => style.strong = true,
            Event::End(TagEnd::Strong) => style.strong = false,
            Event::Start(Tag::Emphasis) => style.emphasis = true,
            Event::End(TagEnd::Emphasis) => style.emphasis = false,
            Event::Start(Tag::CodeBlock(_)) => style.code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                style.code_block = false;
                out.push('\n');
            }
            Event::Start(Tag::List(start)) => {
                if !lists.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let bullet = match lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{}.", n);
                        *n += 1;
                        bullet
                    }
                    _ => "•".to_string(),
                };
                out.push_str(&format!("{}{} ", indent, bullet.yellow()));
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => link = Some(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = link.take() {
                    out.push_str(&format!(" ({})", url.blue().underline()));
                }
            }
            Event::Text(text) if style.code_block => {
                for line in text.lines() {
                    out.push_str(&format!("    {}\n", line.green()));
                }
            }
            Event::Text(text) => out.push_str(&style.apply(&text)),
            Event::Code(code) => out.push_str(&code.yellow().to_string()),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str(&format!("{}\n\n", "─".repeat(40).dimmed())),
            _ => {}
        }
    }

    out.trim_end().to_string()
}
