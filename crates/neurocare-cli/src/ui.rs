//! NeuroCare CLI — Terminal presentation surface
//!
//! All visual rendering lives here. `main.rs` feeds session events in and
//! stays clean.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use neurocare_core::bus::SessionEvent;
use neurocare_core::message::{ChatMessage, Role};

// ─── Banner ──────────────────────────────────────────────────

/// The intro card printed when a chat starts.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}", "  ╔════════════════════════════════════════════╗".cyan());
    println!(
        "{}",
        format!("  ║  🧠 NeuroCare v{:<28}║", version).cyan().bold()
    );
    println!("{}", "  ║     Your mental wellness companion         ║".cyan());
    println!("{}", "  ╚════════════════════════════════════════════╝".cyan());
    println!();
}

/// Printed under the banner at the start of `neurocare chat`.
pub fn print_session_info(username: &str, mood: &str) {
    println!(
        "  {} {} {}  {} {} {} {}",
        "User".dimmed(),
        "›".dimmed(),
        username.green().bold(),
        "│".dimmed(),
        "Mood".dimmed(),
        "›".dimmed(),
        mood.cyan().bold(),
    );
    println!("  {}", "/help for commands  │  /quit to end the chat".dimmed());
    println!();
}

// ─── Prompt ──────────────────────────────────────────────────

pub fn print_prompt() {
    print!("{} ", "You ›".green().bold());
    io::stdout().flush().unwrap_or(());
}

// ─── Help Table ──────────────────────────────────────────────

pub fn print_help() {
    let cmds: &[(&str, &str)] = &[
        ("/quit", "End this chat session"),
        ("/history", "Show the conversation so far"),
        ("/mood", "Show the mood this session started with"),
        ("/help", "Show this command reference"),
    ];

    println!();
    println!("{}", "  Commands ─────────────────────────────────────".cyan());
    for (cmd, desc) in cmds {
        println!(
            "  {:12} {}  {}",
            cmd.bold().cyan(),
            "│".dimmed(),
            desc.dimmed()
        );
    }
    println!("{}", "  ──────────────────────────────────────────────".cyan());
    println!();
}

pub fn print_history(bot_name: &str, transcript: &[ChatMessage]) {
    println!();
    for message in transcript {
        match message.role {
            Role::User => println!("  {} {}", "You ›".green().bold(), message.content),
            Role::Assistant => println!(
                "  {} {}",
                format!("{} ›", bot_name).bright_cyan().bold(),
                message.content
            ),
        }
    }
    println!();
}

// ─── Event Surface ───────────────────────────────────────────

/// Renders session events to the terminal.
///
/// User messages are not echoed since the user just typed them.
pub struct TerminalSurface {
    bot_name: String,
    spinner: Option<ProgressBar>,
    input_locked: bool,
}

impl TerminalSurface {
    pub fn new(bot_name: &str) -> Self {
        Self {
            bot_name: bot_name.to_string(),
            spinner: None,
            input_locked: true,
        }
    }

    pub fn input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn handle(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::MessageAppended(message) if !message.is_user() => {
                println!(
                    "\n{} {}\n",
                    format!("{} ›", self.bot_name).bright_cyan().bold(),
                    message.content
                );
            }
            SessionEvent::MessageAppended(_) => {}
            SessionEvent::TypingStarted => self.show_typing(),
            SessionEvent::TypingStopped => self.hide_typing(),
            SessionEvent::InputLockChanged { locked } => {
                self.input_locked = *locked;
            }
        }
    }

    fn show_typing(&mut self) {
        // at most one indicator
        self.hide_typing();

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.set_message(format!("{} is thinking...", self.bot_name));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn hide_typing(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.hide_typing();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_tracks_input_lock() {
        let mut surface = TerminalSurface::new("NeuroCare AI");
        assert!(surface.input_locked());

        surface.handle(&SessionEvent::InputLockChanged { locked: false });
        assert!(!surface.input_locked());

        surface.handle(&SessionEvent::InputLockChanged { locked: true });
        assert!(surface.input_locked());
    }

    #[test]
    fn test_typing_events_toggle_spinner() {
        let mut surface = TerminalSurface::new("NeuroCare AI");

        surface.handle(&SessionEvent::TypingStarted);
        surface.handle(&SessionEvent::TypingStarted);
        assert!(surface.spinner.is_some());

        surface.handle(&SessionEvent::TypingStopped);
        assert!(surface.spinner.is_none());

        surface.handle(&SessionEvent::MessageAppended(ChatMessage::assistant("hi")));
        surface.handle(&SessionEvent::MessageAppended(ChatMessage::user("hello")));
        assert!(surface.spinner.is_none());
    }

    #[test]
    fn test_printers_do_not_panic() {
        print_banner();
        print_session_info("sam", "Stressed");
        print_help();
        print_history(
            "NeuroCare AI",
            &[ChatMessage::assistant("hi"), ChatMessage::user("hello")],
        );
    }
}
