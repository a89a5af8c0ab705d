//! Chat command - Interactive conversation with the assistant.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use agro_chat::{
    ChatOrchestrator, ChatSettings, ExchangeOutcome, GeminiProvider, GenerationProvider,
    LogEvent, ScriptedProvider, SubmitRejection, TimeoutProvider,
};

use crate::input::clamp_input;
use crate::render::TerminalRenderer;

/// Lines that end the session
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

#[derive(Args)]
pub struct ChatArgs {
    /// Workspace holding .agro/settings.json (defaults to current directory)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Model to use, overriding settings and AGRO_LLM_MODEL
    #[arg(short, long)]
    model: Option<String>,

    /// Seconds to wait for a reply (0 waits indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Answer locally without contacting a provider
    #[arg(long)]
    pub offline: bool,

    /// Disable colours and text styling
    #[arg(long)]
    plain: bool,
}

pub async fn execute(args: ChatArgs, quiet: bool) -> Result<()> {
    let workspace = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let settings = ChatSettings::load(&workspace)
        .context("Failed to load settings")?
        .with_env_overrides()
        .with_model(args.model)
        .with_timeout_secs(args.timeout);

    let provider = build_provider(&settings, args.offline)?;
    let orchestrator = ChatOrchestrator::new(provider);
    let render_task = spawn_renderer(orchestrator.subscribe(), TerminalRenderer::new(args.plain));

    if !quiet {
        println!("🌱 Agri Assistant");
        println!("Ask about farming. Type /quit to leave.\n");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    'session: while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if QUIT_COMMANDS.contains(&line.trim()) {
            break;
        }

        let input = clamp_input(&line);
        let exchange = orchestrator.submit(&input);
        tokio::pin!(exchange);

        // Keep reading while the reply is pending; extra lines are offered to
        // the orchestrator, which turns them away until the exchange ends.
        loop {
            tokio::select! {
                result = &mut exchange => {
                    report(result);
                    break;
                }
                next = lines.next_line() => match next.context("Failed to read input")? {
                    Some(extra) if QUIT_COMMANDS.contains(&extra.trim()) => {
                        info!("Waiting for the pending reply before leaving");
                        report(exchange.await);
                        break 'session;
                    }
                    Some(extra) => report(orchestrator.submit(&clamp_input(&extra)).await),
                    None => {
                        report(exchange.await);
                        break 'session;
                    }
                },
            }
        }
    }

    let exchanges = orchestrator.message_count() / 2;
    drop(orchestrator);
    render_task.await.context("Renderer stopped unexpectedly")?;

    if !quiet {
        println!("👋 Session ended after {} exchange(s)", exchanges);
    }

    Ok(())
}

fn build_provider(settings: &ChatSettings, offline: bool) -> Result<Arc<dyn GenerationProvider>> {
    if offline {
        info!("Offline mode: replies are generated locally");
        return Ok(Arc::new(ScriptedProvider::echo()));
    }

    let gemini = GeminiProvider::from_settings(settings)?;

    Ok(match settings.request_timeout() {
        Some(limit) => Arc::new(TimeoutProvider::new(gemini, limit)),
        None => Arc::new(gemini),
    })
}

/// Rejections are silent to the user; failures already reached the log.
fn report(result: std::result::Result<ExchangeOutcome, SubmitRejection>) {
    match result {
        Ok(outcome) => {
            if let Some(error) = outcome.error() {
                debug!(error = %error, "Exchange ended with the fallback reply");
            }
        }
        Err(rejection) => debug!(%rejection, "Submission ignored"),
    }
}

/// Print every appended message until the log goes away.
fn spawn_renderer(
    mut events: broadcast::Receiver<LogEvent>,
    renderer: TerminalRenderer,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(LogEvent::Appended(message)) => {
                    let mut stdout = std::io::stdout().lock();
                    let _ = write!(stdout, "{}", renderer.render_message(&message));
                    if message.is_user() {
                        let _ = writeln!(stdout, "{}", renderer.thinking_indicator());
                    }
                    let _ = stdout.flush();
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Renderer fell behind, {} message(s) not shown", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_provider_needs_no_key() {
        let settings = ChatSettings {
            api_key_env: "AGRO_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ChatSettings::default()
        };

        assert!(build_provider(&settings, true).is_ok());

        let err = build_provider(&settings, false).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<agro_chat::ProviderError>(),
            Some(agro_chat::ProviderError::NotConfigured(_))
        ));
    }
}
