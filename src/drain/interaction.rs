//! Operator interaction for drain runs.
//!
//! The session asks two yes/no questions (purge confirmation, empty-batch
//! continuation) and reports progress. Both go through a trait so tests can
//! script the answers and capture the output.

use std::io::{self, Write};

use async_trait::async_trait;

use crate::error::Result;

/// Trait for operator interaction
#[async_trait]
pub trait OperatorInteraction: Send + Sync {
    /// Ask a yes/no question. `default_yes` decides how an empty or
    /// unrecognized answer is read.
    async fn confirm(&self, message: &str, default_yes: bool) -> Result<bool>;

    /// Display information message
    fn display_info(&self, message: &str);

    /// Display warning message
    fn display_warning(&self, message: &str);

    /// Display error message
    fn display_error(&self, message: &str);

    /// Display progress
    fn display_progress(&self, message: &str);
}

/// Interaction over the controlling terminal.
pub struct TerminalInteraction;

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }

    fn read_line() -> Result<String> {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

#[async_trait]
impl OperatorInteraction for TerminalInteraction {
    async fn confirm(&self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        print!("{message} {hint}: ");
        io::stdout().flush()?;

        let input = Self::read_line()?.to_lowercase();
        Ok(match input.as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default_yes,
        })
    }

    fn display_info(&self, message: &str) {
        println!("ℹ️  {message}");
    }

    fn display_warning(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }

    fn display_error(&self, message: &str) {
        eprintln!("❌ {message}");
    }

    fn display_progress(&self, message: &str) {
        println!("🔄 {message}");
    }
}
