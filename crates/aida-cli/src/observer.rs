//! Tool progress reporting for the terminal

use colored::*;

use aida_agent::AgentObserver;

/// Prints tool activity as status lines on stderr
#[derive(Debug, Default)]
pub struct CliObserver {
    /// Print nothing
    pub quiet: bool,
}

impl AgentObserver for CliObserver {
    fn on_tool_start(&self, name: &str) {
        if !self.quiet {
            eprintln!("{} {}", "🔧 Using tool:".cyan(), name.bold());
        }
    }

    fn on_tool_finish(&self, name: &str, is_error: bool) {
        if self.quiet {
            return;
        }
        if is_error {
            eprintln!("{} {} reported an error", "⚠️ ".yellow(), name);
        } else {
            eprintln!("{} {} done", "✅".green(), name);
        }
    }

    fn on_analysing(&self) {
        if !self.quiet {
            eprintln!("{}", "🧠 Analysing results...".dimmed());
        }
    }
}
