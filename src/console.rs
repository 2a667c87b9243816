//! Styled console output for the interactive loop.

use colored::Colorize;

/// Readline prompt. Kept free of ANSI codes so the line editor's cursor
/// math stays correct.
pub const PROMPT: &str = "you ❯ ";

pub fn banner(provider_id: &str, model_id: &str) {
    println!("{}", "Spec Forge".bold().blue());
    println!(
        "{}",
        format!("interview-driven specification generator · {provider_id} · {model_id}").dimmed()
    );
    println!();
}

pub fn greeting() {
    agent_reply(
        "Hi! I'm here to help you write your specification. \
         What feature or app are you looking to build today?",
    );
    notice("Type 'save' to snapshot the session, 'exit' or 'quit' to end.");
}

pub fn agent_reply(text: &str) {
    println!("\n{} {text}\n", "agent ❯".bold().yellow());
}

pub fn thinking() {
    println!("{}", "thinking…".dimmed());
}

pub fn notice(text: &str) {
    println!("{}", text.dimmed());
}

pub fn success(text: &str) {
    println!("{}", text.green());
}

pub fn error(text: &str) {
    eprintln!("{} {text}", "error:".bold().red());
}
