//! Format command - Render assistant markup from a file or stdin.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncReadExt;
use tracing::debug;

use agro_chat::markup;

use crate::render::TerminalRenderer;

#[derive(Args)]
pub struct FormatArgs {
    /// File containing raw reply text (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Print the parsed segments as JSON instead of styled text
    #[arg(long)]
    json: bool,

    /// Disable colours and text styling
    #[arg(long)]
    plain: bool,
}

pub async fn execute(args: FormatArgs) -> Result<()> {
    let raw = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read stdin")?;
            buffer
        }
    };

    // A trailing newline from the file would otherwise render as an empty line
    let raw = raw.strip_suffix('\n').unwrap_or(&raw);
    let segments = markup::parse(raw);
    debug!("Parsed {} segment(s)", segments.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
    } else {
        println!("{}", TerminalRenderer::new(args.plain).render_segments(&segments));
    }

    Ok(())
}
