//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod chat;
pub mod format;

/// Agri Assistant - farming questions answered in your terminal
#[derive(Parser)]
#[command(name = "agro")]
#[command(version, about = "Agri Assistant - farming questions answered in your terminal")]
#[command(long_about = r#"
Agri Assistant is a terminal chat for agricultural questions. Replies are
rendered with light markup: *italic*, **bold**, ***bold italic*** and
"* " bullet lines.

COMMANDS:
  chat    → Interactive conversation with the assistant
  format  → Render assistant markup from a file or stdin

ENVIRONMENT:
  GEMINI_API_KEY   API key for the generation provider
  AGRO_LLM_MODEL   Model override (default: gemini-1.5-pro)

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Generation provider not configured
  4 - Settings error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive conversation
    Chat(chat::ChatArgs),

    /// Render assistant markup from a file or stdin
    Format(format::FormatArgs),
}
