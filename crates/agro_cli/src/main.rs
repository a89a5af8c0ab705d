//! Agri Assistant CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Generation provider not configured
//! - 4: Settings error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agro_chat::{ProviderError, SettingsError};

mod commands;
mod input;
mod render;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const PROVIDER_NOT_CONFIGURED: u8 = 3;
    pub const SETTINGS_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let result = match cli.command {
        Commands::Chat(args) => commands::chat::execute(args, cli.quiet).await,
        Commands::Format(args) => commands::format::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so they never interleave with the transcript on stdout.
fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agro={level},agro_chat={level},warn", level = default_level))
    });

    let log_result = if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Map an error to its exit code by variant
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(provider_error) = e.downcast_ref::<ProviderError>() {
        return match provider_error {
            ProviderError::NotConfigured(_) => ExitCodes::PROVIDER_NOT_CONFIGURED,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    if e.downcast_ref::<SettingsError>().is_some() {
        return ExitCodes::SETTINGS_ERROR;
    }

    if e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    {
        return ExitCodes::INVALID_ARGS;
    }

    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categorize_error_by_variant() {
        let not_configured = anyhow::Error::new(ProviderError::NotConfigured("GEMINI_API_KEY".into()));
        assert_eq!(categorize_error(&not_configured), ExitCodes::PROVIDER_NOT_CONFIGURED);

        let wrapped: anyhow::Result<()> = Err(ProviderError::NotConfigured("KEY".into()))
            .context("Failed to create provider");
        assert_eq!(
            categorize_error(&wrapped.unwrap_err()),
            ExitCodes::PROVIDER_NOT_CONFIGURED
        );

        let missing = anyhow::Error::new(std::io::Error::new(std::io::ErrorKind::NotFound, "nope"));
        assert_eq!(categorize_error(&missing), ExitCodes::INVALID_ARGS);

        let other = anyhow::anyhow!("something else");
        assert_eq!(categorize_error(&other), ExitCodes::GENERAL_ERROR);
    }
}
