use crate::model::{DisplayState, Fingerprint};
use colored::Colorize;

pub fn display_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}

pub fn display_info(message: &str) {
    println!("{} {}", "Info:".blue(), message);
}

/// Render the three UI states: loading, ready digest, or error
pub fn display_state(state: &DisplayState) {
    match state {
        DisplayState::Loading => println!("{}", "Loading...".yellow()),
        DisplayState::Ready { digest } => println!("{}", digest.green().bold()),
        DisplayState::Error { message } => display_error(message),
    }
}

pub fn display_fingerprint(fingerprint: &Fingerprint) {
    println!("{} {}", "Canonical:".dimmed(), fingerprint.canonical);
    println!(
        "{} {}",
        format!("Digest (v{}):", fingerprint.algorithm_version).dimmed(),
        fingerprint.digest.green().bold()
    );
}
