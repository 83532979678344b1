//! Headless board runner (default binary).
//!
//! Reads protocol commands from stdin, one JSON object per line, and writes
//! session output to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tile_match::adapter::{InboundCommand, OutboundMessage, SessionConfig, SessionHandle};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env();
    info!(
        orientation = config.layout.orientation().as_str(),
        seed = config.seed,
        "starting tile-match session"
    );
    let mut handle = SessionHandle::spawn(&config).context("failed to start session")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if handle.send(InboundCommand::from_line(&line)).await.is_err() {
                    break;
                }
            }
            msg = handle.recv() => {
                let Some(msg) = msg else { break };
                write_line(&mut stdout, &msg).await?;
            }
        }
    }

    let (stats, rest) = handle.shutdown().await?;
    for msg in &rest {
        write_line(&mut stdout, msg).await?;
    }
    info!(
        matches = stats.matches,
        misses = stats.misses,
        cells_cleared = stats.cells_cleared,
        "bye"
    );
    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, msg: &OutboundMessage) -> Result<()> {
    let mut line = msg.to_line().context("failed to encode outbound message")?;
    line.push('\n');
    stdout
        .write_all(line.as_bytes())
        .await
        .context("failed to write stdout")?;
    stdout.flush().await.context("failed to flush stdout")?;
    Ok(())
}
